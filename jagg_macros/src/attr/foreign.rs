use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};

///
/// `#[foreign(Self(fk) => Other)]`: this table references `Other`.
/// `#[foreign(Other(fk) => Self)]`: `Other` references this table.
///
/// The referenced side is always joined through its primary key.
///
pub struct Foreign {
    pub span: Span,
    pub foreign_table_path: syn::Path,
    pub foreign_key: syn::Ident,
    pub direction: Direction,
}

pub struct ColumnTuple {
    pub table: Table,
    pub columns: Vec<syn::Ident>,
}

pub enum Table {
    Zelf,
    Foreign(syn::Path),
}

pub enum Direction {
    SelfReferencesForeign,
    ForeignReferencesSelf,
}

impl Foreign {
    pub fn is_collection(&self) -> bool {
        match &self.direction {
            Direction::ForeignReferencesSelf => true,
            Direction::SelfReferencesForeign => false,
        }
    }
}

impl Parse for Foreign {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let content;
        let _paren_token = syn::parenthesized!(content in input);
        let content_span = content.span();

        let first: ColumnTuple = content.parse()?;
        let _arrow: syn::token::FatArrow = content.parse()?;
        let second: ColumnTuple = content.parse()?;

        if !second.columns.is_empty() {
            return Err(syn::Error::new(
                content_span,
                "The referenced side is joined through its primary key, remove its columns",
            ));
        }

        let (table, direction) = match (first.table, second.table) {
            (Table::Zelf, Table::Foreign(path)) => (path, Direction::SelfReferencesForeign),
            (Table::Foreign(path), Table::Zelf) => (path, Direction::ForeignReferencesSelf),
            (Table::Zelf, Table::Zelf) => {
                return Err(syn::Error::new(
                    content_span,
                    "Name the table explicitly on one side instead of Self => Self",
                ))
            }
            (Table::Foreign(_), Table::Foreign(_)) => {
                return Err(syn::Error::new(content_span, "No Self found"))
            }
        };

        let mut columns = first.columns.into_iter();
        let foreign_key = match (columns.next(), columns.next()) {
            (Some(column), None) => column,
            _ => {
                return Err(syn::Error::new(
                    content_span,
                    "Must specify exactly one foreign key column",
                ))
            }
        };

        Ok(Self {
            span: content_span,
            foreign_table_path: table,
            foreign_key,
            direction,
        })
    }
}

impl Parse for ColumnTuple {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let table = if input.peek(syn::token::SelfType) {
            let _: syn::token::SelfType = input.parse()?;
            Table::Zelf
        } else {
            Table::Foreign(input.parse()?)
        };

        let mut columns = vec![];

        if input.peek(syn::token::Paren) {
            let content;
            let _paren_token = syn::parenthesized!(content in input);

            let punctuated = content
                .parse_terminated::<syn::Ident, syn::token::Comma>(syn::Ident::parse)?;
            columns.extend(punctuated);
        }

        Ok(Self { table, columns })
    }
}
