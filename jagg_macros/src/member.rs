use proc_macro2::Span;
use quote::*;
use syn::spanned::Spanned;

use crate::attr::attr_util;
use crate::attr::foreign;

/// One bodiless associated function inside a `#[table]` impl block.
pub struct Member {
    pub span: Span,
    pub field_name: syn::LitStr,
    pub meta: Meta,
    kind: Kind,
}

enum Kind {
    Column { primary_key: bool, column: syn::LitStr },
    Foreign(foreign::Foreign),
    Embed(syn::Path),
}

enum Quantified<T> {
    Unit(T),
    Slice(T),
}

#[derive(Default)]
pub struct Meta {
    pub primary_key: Option<Span>,
    pub column: Option<syn::LitStr>,
    pub json: Option<syn::LitStr>,
    pub foreign: Option<foreign::Foreign>,
    pub embed: Option<Span>,
}

impl Member {
    pub fn try_from_ast(method: syn::TraitItemMethod) -> syn::Result<Self> {
        let span = method.span();
        let mut meta = meta_from_attrs(method.attrs)?;

        if let Some(input) = method.sig.inputs.first() {
            return Err(syn::Error::new(input.span(), "Expected no arguments"));
        }

        let field_name = syn::LitStr::new(&method.sig.ident.to_string(), method.sig.ident.span());
        let return_type = extract_quantified_return_type(method.sig.output, span)?;

        let kind = match (meta.foreign.take(), meta.embed) {
            (Some(_), Some(embed_span)) => {
                return Err(syn::Error::new(
                    embed_span,
                    "A member cannot be both #[embed] and #[foreign]",
                ))
            }
            (None, Some(_)) => match return_type {
                Quantified::Unit(path) => Kind::Embed(path),
                Quantified::Slice(path) => {
                    return Err(syn::Error::new(
                        path.span(),
                        "An embedded fragment must not be a slice",
                    ))
                }
            },
            (Some(foreign), None) => match (return_type, foreign.is_collection()) {
                (Quantified::Slice(_), true) | (Quantified::Unit(_), false) => {
                    Kind::Foreign(foreign)
                }
                (Quantified::Unit(path), true) => {
                    return Err(syn::Error::new(
                        path.span(),
                        "Expected a slice, the foreign table references Self",
                    ))
                }
                (Quantified::Slice(path), false) => {
                    return Err(syn::Error::new(
                        path.span(),
                        "Expected a unit type, Self references the foreign table",
                    ))
                }
            },
            (None, None) => {
                if let Quantified::Slice(path) = return_type {
                    return Err(syn::Error::new(
                        path.span(),
                        "A column must not be a slice",
                    ));
                }
                Kind::Column {
                    primary_key: meta.primary_key.is_some(),
                    column: meta.column.clone().unwrap_or_else(|| field_name.clone()),
                }
            }
        };

        if !matches!(kind, Kind::Column { .. }) {
            if let Some(pk_span) = meta.primary_key {
                return Err(syn::Error::new(pk_span, "Only a column can be a primary key"));
            }
            if let Some(column) = &meta.column {
                return Err(syn::Error::new(column.span(), "Only a column can be renamed"));
            }
        }

        Ok(Self {
            span,
            field_name,
            meta,
            kind,
        })
    }

    pub fn primary_key_column(&self) -> Option<&syn::LitStr> {
        match &self.kind {
            Kind::Column {
                primary_key: true,
                column,
            } => Some(column),
            _ => None,
        }
    }
}

/// The statement appending this member to the `schema` being built.
pub fn gen_member(member: &Member) -> proc_macro2::TokenStream {
    let span = member.span;
    let field_name = &member.field_name;
    let json_key = member.meta.json.as_ref().map(|json| {
        quote! { .json_key(#json) }
    });

    match &member.kind {
        Kind::Column { column, .. } => {
            let json_key = member.meta.json.as_ref().unwrap_or(field_name);
            quote_spanned! {span=>
                let schema = schema.field(::jagg::Field::new(#column).json_key(#json_key));
            }
        }
        Kind::Foreign(foreign) => {
            let fspan = foreign.span;
            let target = &foreign.foreign_table_path;
            let foreign_key = syn::LitStr::new(&foreign.foreign_key.to_string(), foreign.foreign_key.span());
            let constructor = if foreign.is_collection() {
                quote_spanned! {fspan=> many }
            } else {
                quote_spanned! {fspan=> one }
            };

            quote_spanned! {span=>
                let schema = schema.relation(
                    ::jagg::RelationLink::#constructor(
                        #field_name,
                        #foreign_key,
                        <#target as ::jagg::Table>::schema,
                    ) #json_key
                );
            }
        }
        Kind::Embed(target) => {
            quote_spanned! {span=>
                let schema = schema.relation(
                    ::jagg::RelationLink::embed(
                        #field_name,
                        <#target as ::jagg::Table>::schema,
                    ) #json_key
                );
            }
        }
    }
}

fn extract_quantified_return_type(
    ret_ty: syn::ReturnType,
    member_span: Span,
) -> syn::Result<Quantified<syn::Path>> {
    let user_ty = match ret_ty {
        syn::ReturnType::Default => return Err(syn::Error::new(member_span, "Expected return type")),
        syn::ReturnType::Type(_, ty) => *ty,
    };

    match user_ty {
        syn::Type::Slice(type_slice) => Ok(Quantified::Slice(extract_path(*type_slice.elem)?)),
        ty => Ok(Quantified::Unit(extract_path(ty)?)),
    }
}

fn extract_path(ty: syn::Type) -> syn::Result<syn::Path> {
    match ty {
        syn::Type::Path(type_path) if type_path.qself.is_none() => Ok(type_path.path),
        ty => Err(syn::Error::new(ty.span(), "Expected simple Path-like type")),
    }
}

fn meta_from_attrs(attrs: Vec<syn::Attribute>) -> syn::Result<Meta> {
    let mut meta = Meta::default();

    for attr in attrs {
        if attr_util::attr_has_simple_ident(&attr, "doc") {
            continue;
        } else if attr_util::attr_has_simple_ident(&attr, "primary_key") {
            attr_util::expect_flag(&attr)?;
            meta.primary_key = Some(attr.path.span());
        } else if attr_util::attr_has_simple_ident(&attr, "embed") {
            attr_util::expect_flag(&attr)?;
            meta.embed = Some(attr.path.span());
        } else if attr_util::attr_has_simple_ident(&attr, "column") {
            let attr_util::EqLitStr(lit) = syn::parse2(attr.tokens)?;
            meta.column = Some(lit);
        } else if attr_util::attr_has_simple_ident(&attr, "json") {
            let attr_util::EqLitStr(lit) = syn::parse2(attr.tokens)?;
            meta.json = Some(lit);
        } else if attr_util::attr_has_simple_ident(&attr, "foreign") {
            meta.foreign = Some(syn::parse2(attr.tokens)?);
        } else {
            return Err(syn::Error::new(attr.path.span(), "Unrecognized attribute"));
        }
    }

    Ok(meta)
}
