#![forbid(unsafe_code)]

extern crate proc_macro;

mod member;
mod table;

mod attr {
    pub mod attr_util;
    pub mod foreign;
}

use proc_macro::TokenStream;

///
/// Describe a table by listing its columns and relations as bodiless
/// associated functions, generating an implementation of `jagg::Table`.
///
/// ```ignore
/// pub struct User;
/// pub struct Song;
///
/// #[jagg::table("user")]
/// impl Table for User {
///     #[primary_key]
///     fn id() -> i64;
///
///     #[json = "displayName"]
///     fn name() -> String;
///
///     #[foreign(Song(user_id) => Self)]
///     fn songs() -> [Song];
/// }
///
/// #[jagg::table("song")]
/// impl Table for Song {
///     #[primary_key]
///     fn id() -> i64;
///
///     #[foreign(Self(user_id) => User)]
///     fn user() -> User;
/// }
/// ```
///
/// Without a table name the type is a fragment, only usable through `#[embed]`.
///
#[proc_macro_attribute]
pub fn table(args: TokenStream, input: TokenStream) -> TokenStream {
    let table_name = if args.is_empty() {
        None
    } else {
        Some(syn::parse_macro_input!(args as syn::LitStr))
    };
    let impl_table = syn::parse_macro_input!(input as table::ImplTable);

    let tokens = table::gen_table(table_name, impl_table);

    TokenStream::from(tokens)
}
