use quote::quote;
use syn::parse::ParseStream;

use crate::member;

/// `impl Table for X { ... }` or `impl X { ... }`.
pub struct ImplTable {
    pub path: syn::Path,
    pub member_results: Vec<syn::Result<member::Member>>,
}

impl syn::parse::Parse for ImplTable {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let _attrs = input.call(syn::Attribute::parse_outer)?;
        let _: syn::token::Impl = input.parse()?;
        let mut path: syn::Path = input.parse()?;

        if input.peek(syn::token::For) {
            let _: syn::token::For = input.parse()?;
            path = input.parse()?;
        }

        let content;
        let _brace_token = syn::braced!(content in input);

        let mut member_results = Vec::new();
        while !content.is_empty() {
            let method: syn::TraitItemMethod = content.parse()?;
            member_results.push(member::Member::try_from_ast(method));
        }

        Ok(ImplTable {
            path,
            member_results,
        })
    }
}

pub fn gen_table(table_name: Option<syn::LitStr>, impl_table: ImplTable) -> proc_macro2::TokenStream {
    let path = &impl_table.path;
    let type_name = match path.segments.last() {
        Some(segment) => syn::LitStr::new(&segment.ident.to_string(), segment.ident.span()),
        None => return syn::Error::new_spanned(path, "Expected a type").to_compile_error(),
    };

    let table_name = table_name.map(|table_name| {
        quote! { let schema = schema.table_name(#table_name); }
    });

    let mut primary_keys = impl_table
        .member_results
        .iter()
        .filter_map(|result| result.as_ref().ok())
        .filter_map(|member| member.primary_key_column().map(|column| (member, column)));

    let primary_key = match (primary_keys.next(), primary_keys.next()) {
        (None, _) => quote! {},
        (Some((_, column)), None) => quote! { let schema = schema.primary_key(#column); },
        (Some(_), Some((second, _))) => {
            syn::Error::new(second.span, "Only one primary key is supported").to_compile_error()
        }
    };

    let members = impl_table.member_results.iter().map(|result| {
        result
            .as_ref()
            .map(member::gen_member)
            .unwrap_or_else(|err| err.to_compile_error())
    });

    quote! {
        impl ::jagg::Table for #path {
            fn schema() -> ::jagg::TableSchema {
                let schema = ::jagg::TableSchema::new(#type_name);
                #table_name
                #primary_key
                #(#members)*
                schema
            }
        }
    }
}
