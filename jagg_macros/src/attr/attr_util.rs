use syn::parse::ParseStream;

pub fn attr_has_simple_ident(attr: &syn::Attribute, name: &str) -> bool {
    let path = &attr.path;
    if path.leading_colon.is_some() || path.segments.len() != 1 {
        return false;
    }

    match path.segments.last() {
        Some(segment) => segment.ident == name,
        None => false,
    }
}

/// The `"value"` of `#[name = "value"]`.
pub struct EqLitStr(pub syn::LitStr);

impl syn::parse::Parse for EqLitStr {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let _: syn::token::Eq = input.parse()?;
        Ok(Self(input.parse()?))
    }
}

/// Check that a flag attribute like `#[embed]` carries no tokens.
pub fn expect_flag(attr: &syn::Attribute) -> syn::Result<()> {
    if attr.tokens.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &attr.tokens,
            "Expected no arguments",
        ))
    }
}
