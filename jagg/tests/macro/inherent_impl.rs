pub struct Label;
pub struct Release;

#[jagg::table("label")]
impl Label {
    #[primary_key]
    #[column = "label_id"]
    fn id() -> i64;

    /// Shown on the cover.
    fn name() -> String;

    #[foreign(Release(label_id) => Self)]
    #[json = "catalogue"]
    fn releases() -> [Release];
}

#[jagg::table("release")]
impl Release {
    #[primary_key]
    fn id() -> i64;

    #[foreign(Self(label_id) => Label)]
    fn label() -> Label;
}

fn main() {
    use jagg::Table;

    let schema = Label::schema();
    assert_eq!(schema.primary_key.as_deref(), Some("label_id"));
    assert_eq!(schema.fields[0].json_key, "id");
    assert_eq!(schema.relations[0].json_key, "catalogue");
    assert_eq!(schema.relations[0].kind, jagg::RelationKind::Many);
    assert_eq!(Release::schema().relations[0].kind, jagg::RelationKind::One);
}
