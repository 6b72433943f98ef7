pub struct Timestamps;
pub struct Versioned;
pub struct Document;

#[jagg::table]
impl Timestamps {
    fn created_at() -> String;
}

#[jagg::table]
impl Versioned {
    #[primary_key]
    fn id() -> i64;

    fn version() -> i32;

    #[embed]
    fn timestamps() -> Timestamps;
}

#[jagg::table("document")]
impl Document {
    fn body() -> String;

    #[embed]
    fn versioned() -> Versioned;
}

fn main() {
    use jagg::Table;

    let schema = Document::schema().resolve().unwrap();
    assert_eq!(schema.primary_key.as_deref(), Some("id"));

    let keys: Vec<_> = schema.fields.iter().map(|field| field.json_key.as_str()).collect();
    assert_eq!(keys, ["created_at", "id", "version", "body"]);
}
