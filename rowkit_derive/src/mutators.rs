use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Error, FnArg, ImplItem, ItemImpl, Type, Visibility};

pub fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return Error::new_spanned(attr, "#[mutators] takes no arguments").to_compile_error();
    }
    let input: ItemImpl = match syn::parse2(item) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match mutator_table(&input) {
        Ok(table) => quote! {
            #input
            #table
        },
        Err(err) => err.to_compile_error(),
    }
}

fn mutator_table(input: &ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(Error::new_spanned(
            path,
            "#[mutators] goes on an inherent impl block",
        ));
    }
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "#[mutators] does not support generic types",
        ));
    }
    let self_ty = &input.self_ty;

    let mut shims = Vec::new();
    let mut entries = Vec::new();

    for item in &input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let sig = &method.sig;
        if !matches!(method.vis, Visibility::Public(_))
            || sig.asyncness.is_some()
            || sig.inputs.len() != 2
        {
            continue;
        }
        let mut inputs = sig.inputs.iter();
        let Some(FnArg::Receiver(receiver)) = inputs.next() else {
            continue;
        };
        if receiver.reference.is_none() || receiver.mutability.is_none() {
            continue;
        }
        let Some(FnArg::Typed(arg)) = inputs.next() else {
            continue;
        };
        let Some(shape) = shape_of(&arg.ty) else {
            continue;
        };

        let method_ident = &sig.ident;
        let method_name = method_ident.to_string();
        let shim = format_ident!("__rowkit_mutator_{}", entries.len());
        let (variant, shape) = match shape {
            Shape::Text => (quote!(Text), quote!(Text)),
            Shape::Integer => (quote!(Integer), quote!(Integer)),
        };

        shims.push(quote! {
            fn #shim(this: &mut #self_ty, value: ::rowkit::Value) {
                if let ::rowkit::Value::#variant(value) = value {
                    this.#method_ident(value);
                }
            }
        });
        entries.push(quote! {
            ::rowkit::Mutator {
                name: #method_name,
                shape: ::rowkit::ValueShape::#shape,
                apply: #shim,
            }
        });
    }

    Ok(quote! {
        impl ::rowkit::Mutators for #self_ty {
            fn mutators() -> &'static [::rowkit::Mutator<Self>] {
                #(#shims)*
                const MUTATORS: &[::rowkit::Mutator<#self_ty>] = &[#(#entries),*];
                MUTATORS
            }
        }
    })
}

enum Shape {
    Text,
    Integer,
}

fn shape_of(ty: &Type) -> Option<Shape> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let last = path.path.segments.last()?;
    if !last.arguments.is_none() {
        return None;
    }
    if last.ident == "String" {
        Some(Shape::Text)
    } else if last.ident == "i32" {
        Some(Shape::Integer)
    } else {
        None
    }
}
