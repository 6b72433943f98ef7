/// Text buffer for SQL output, aware of indentation.
///
/// In compact mode every line break collapses into a single space.
pub struct QueryBuilder {
    pretty: bool,
    indent: u16,
    buf: String,
}

const INDENT_WIDTH: usize = 2;

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_column(qualifier: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(qualifier), quote_ident(column))
}

impl QueryBuilder {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            indent: 0,
            buf: String::new(),
        }
    }

    pub fn build(self) -> String {
        self.buf
    }

    pub fn newline_indent(&mut self) {
        self.indent += 1;
        self.newline();
    }

    pub fn newline_outdent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.newline();
    }

    pub fn newline(&mut self) {
        if self.pretty {
            self.push("\n");
            self.buf
                .extend((0..self.indent as usize * INDENT_WIDTH).map(|_| ' '));
        } else {
            self.push(" ");
        }
    }

    pub fn push(&mut self, str: &str) {
        self.buf.push_str(str);
    }

    /// Push a double-quoted identifier.
    pub fn push_ident(&mut self, ident: &str) {
        self.buf.push_str(&quote_ident(ident));
    }

    /// Push `"qualifier"."column"`.
    pub fn push_column(&mut self, qualifier: &str, column: &str) {
        self.buf.push_str(&quote_column(qualifier, column));
    }

    /// Push a single-quoted string literal.
    pub fn push_literal(&mut self, literal: &str) {
        self.buf.push('\'');
        self.buf.push_str(&literal.replace('\'', "''"));
        self.buf.push('\'');
    }
}
