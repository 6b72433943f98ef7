pub struct Track;

#[jagg::table("track")]
impl Track {
    #[index]
    fn id() -> i64;
}

fn main() {
    let _ = Track;
}
