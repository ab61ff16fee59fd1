#![allow(non_snake_case)]

use rowkit::{Entity, Filter, Store, StoreConfig, mutators};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Entity)]
#[entity(table_name = "userx_table", database = "demo.db")]
pub struct User {
    #[column(sql_type = "INTEGER", primary)]
    mUserId: Option<i32>,
    #[column]
    name: Option<String>,
    #[column(name = "mail")]
    email: Option<String>,
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
}

#[tokio::main]
async fn main() -> rowkit::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "rowkit=debug".into()),
        )
        .init();

    let mut config = StoreConfig::from_env()?;
    if std::env::var_os("ROWKIT_DATA_DIR").is_none() {
        config.data_dir = std::env::temp_dir().join("rowkit-demo");
    }
    let store = Store::new(config);

    let ada = User {
        mUserId: Some(1),
        name: Some("Ada".into()),
        email: Some("ada@mail.com".into()),
    };
    let id = store.upsert(&ada).await?;
    println!("upserted row {id:?}");

    let found: Vec<User> = store.query(Filter::all().eq("mail", "ada@mail.com")).await?;
    println!("found {found:?}");

    let users = store.table::<User>();
    println!("all users: {:?}", users.all().await?);

    users.delete(["mUserId = 1"]).await?;
    println!("after delete: {:?}", users.all().await?);

    Ok(())
}
