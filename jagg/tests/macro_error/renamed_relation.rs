pub struct Track;
pub struct Album;

#[jagg::table("track")]
impl Track {
    #[column = "album"]
    #[foreign(Self(album_id) => Album)]
    fn album() -> Album;
}

fn main() {
    let _ = (Track, Album);
}
