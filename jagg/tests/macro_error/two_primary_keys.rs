pub struct Track;

#[jagg::table("track")]
impl Track {
    #[primary_key]
    fn id() -> i64;
    #[primary_key]
    fn code() -> String;
}

fn main() {
    let _ = Track;
}
