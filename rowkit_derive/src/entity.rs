use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, LitStr, Meta};

const DEFAULT_DATABASE: &str = "rowkit.db";

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

///
/// ColumnAttr
///

#[derive(Default)]
struct ColumnAttr {
    name: Option<String>,
    sql_type: Option<String>,
    primary: bool,
    uuid: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let ident = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic types",
        ));
    }

    // -------- table / database --------
    let mut table_name = ident.to_string().to_lowercase();
    let mut database = DEFAULT_DATABASE.to_string();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("entity")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table_name") {
                table_name = meta.value()?.parse::<LitStr>()?.value();
            } else if meta.path.is_ident("database") {
                database = meta.value()?.parse::<LitStr>()?.value();
            } else {
                return Err(meta.error("expected `table_name` or `database`"));
            }
            Ok(())
        })?;
    }

    // -------- fields --------
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(Error::new_spanned(
                    other,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                ident,
                "Entity can only be derived for structs with named fields",
            ));
        }
    };

    let mut columns = Vec::new();
    let mut value_arms = Vec::new();
    let mut primary_seen = false;
    let mut stored_names = HashSet::new();

    for field in fields {
        let Some(column) = column_attr(field)? else {
            continue;
        };
        let field_ident = field.ident.as_ref().expect("named field");
        let field_name = field_ident.to_string();
        let ty = &field.ty;

        if column.primary {
            if primary_seen {
                return Err(Error::new_spanned(
                    field_ident,
                    "only one column may be the primary key",
                ));
            }
            primary_seen = true;
        }

        let stored_name = column.name.clone().unwrap_or_else(|| field_name.clone());
        if !stored_names.insert(stored_name.clone()) {
            return Err(Error::new_spanned(
                field_ident,
                format!("duplicate column name `{stored_name}`"),
            ));
        }

        let mut descriptor = quote! {
            ::rowkit::ColumnDescriptor::new(
                #field_name,
                <#ty as ::rowkit::ColumnValue>::SHAPE,
            )
        };
        if let Some(name) = &column.name {
            descriptor = quote! { #descriptor.named(#name) };
        }
        if let Some(sql_type) = &column.sql_type {
            descriptor = quote! { #descriptor.sql_type(#sql_type) };
        }
        if column.primary {
            descriptor = quote! { #descriptor.primary() };
        }
        if column.uuid {
            descriptor = quote! { #descriptor.uuid() };
        }
        columns.push(descriptor);

        value_arms.push(quote! {
            #field_name => ::rowkit::ColumnValue::to_value(&self.#field_ident),
        });
    }

    Ok(quote! {
        impl ::rowkit::Entity for #ident {
            const TABLE_NAME: &'static str = #table_name;
            const DATABASE: &'static str = #database;

            fn columns() -> &'static [::rowkit::ColumnDescriptor] {
                const COLUMNS: &[::rowkit::ColumnDescriptor] = &[#(#columns),*];
                COLUMNS
            }

            fn field_value(&self, field: &str) -> ::core::option::Option<::rowkit::Value> {
                match field {
                    #(#value_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

// `None` when the field carries no `#[column]` attribute.
fn column_attr(field: &syn::Field) -> syn::Result<Option<ColumnAttr>> {
    let mut found = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("column")) {
        let column = found.get_or_insert_with(ColumnAttr::default);
        match &attr.meta {
            Meta::Path(_) => continue,
            Meta::List(_) => {}
            Meta::NameValue(_) => {
                return Err(Error::new_spanned(
                    attr,
                    "expected `#[column]` or `#[column(...)]`",
                ));
            }
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                column.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("sql_type") {
                column.sql_type = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("primary") {
                column.primary = true;
            } else if meta.path.is_ident("uuid") {
                column.uuid = true;
            } else {
                return Err(meta.error("expected `name`, `sql_type`, `primary` or `uuid`"));
            }
            Ok(())
        })?;
    }
    Ok(found)
}
