//! Entities shared by the unit tests.
#![allow(non_snake_case)]

use crate::{Entity, mutators};

#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[entity(table_name = "user", database = "users.db")]
pub struct User {
    #[column(sql_type = "INTEGER", primary)]
    pub mUserId: Option<i32>,
    #[column]
    pub name: Option<String>,
    #[column(name = "mail")]
    pub email: Option<String>,
    #[column]
    pub age: Option<i32>,
    pub session: Option<String>,
}

#[mutators]
impl User {
    pub fn setmUserId(&mut self, id: i32) {
        self.mUserId = Some(id);
    }

    pub fn setName(&mut self, name: String) {
        self.name = Some(name);
    }

    pub fn setEmail(&mut self, email: String) {
        self.email = Some(email);
    }

    // Wrong shape for an integer column, so the resolver must not pick it.
    pub fn setAge(&mut self, age: String) {
        self.age = age.parse().ok();
    }

    pub fn setSession(&mut self, session: String) {
        self.session = Some(session);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Entity)]
pub struct Note {
    #[column(primary, uuid)]
    pub id: Option<String>,
    #[column]
    pub body: Option<String>,
    #[column]
    pub x: i32,
}

#[mutators]
impl Note {
    pub fn setId(&mut self, id: String) {
        self.id = Some(id);
    }

    pub fn setBody(&mut self, body: String) {
        self.body = Some(body);
    }

    pub fn setX(&mut self, x: i32) {
        self.x = x;
    }
}
