use super::*;

/// The media data atom. Only its head is modeled, the content is streamed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mdat;

impl Atom for Mdat {
    const FOURCC: Fourcc = MEDIA_DATA;
}

impl Mdat {
    pub fn head(content_len: u64) -> Head {
        Head::from(Size::from(content_len), Self::FOURCC)
    }

    pub fn write_head(writer: &mut impl Write, content_len: u64) -> crate::Result<()> {
        head::write(writer, Self::head(content_len))
    }
}
