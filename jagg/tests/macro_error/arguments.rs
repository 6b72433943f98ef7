pub struct Track;

#[jagg::table("track")]
impl Track {
    fn id(value: i64) -> i64;
}

fn main() {
    let _ = Track;
}
