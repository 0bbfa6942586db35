use super::*;

/// The legacy QuickTime text sample description.
///
/// ```md
/// 4 bytes size
/// 4 bytes type (`text`)
/// 6 bytes reserved
/// 2 bytes data reference index
/// 4 bytes display flags
/// 4 bytes text justification
/// 6 bytes background color (rgb)
/// 8 bytes default text box (top, left, bottom, right)
/// 8 bytes reserved
/// 2 bytes font number
/// 2 bytes font face
/// 1 byte reserved
/// 2 bytes reserved
/// 6 bytes foreground color (rgb)
/// 1 byte font name length
/// n bytes font name
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TextSampleEntry {
    /// Index into the `dref` table, starting at 1.
    pub data_reference_index: u16,
    /// Display flags such as scrolling or anti-aliasing.
    pub display_flags: u32,
    /// 0 left, 1 centered, -1 right.
    pub justification: i32,
    /// RGB with 16 bits per channel.
    pub background_color: [u16; 3],
    /// Where text is drawn when a sample doesn't carry its own box.
    pub default_text_box: TextBox,
    /// The QuickTime font number, 0 for the system font.
    pub font_number: u16,
    /// Style bits such as bold or italic.
    pub font_face: u16,
    /// RGB with 16 bits per channel.
    pub foreground_color: [u16; 3],
    /// At most 255 bytes.
    pub font_name: String,
}

/// A rectangle in pixels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextBox {
    /// Top edge.
    pub top: i16,
    /// Left edge.
    pub left: i16,
    /// Bottom edge.
    pub bottom: i16,
    /// Right edge.
    pub right: i16,
}

impl Default for TextSampleEntry {
    fn default() -> Self {
        Self {
            data_reference_index: 1,
            display_flags: 0,
            justification: 0,
            background_color: [0; 3],
            default_text_box: TextBox::default(),
            font_number: 0,
            font_face: 0,
            foreground_color: [0; 3],
            font_name: String::new(),
        }
    }
}

impl TextSampleEntry {
    /// The size of the record without a font name.
    pub const FIXED_LEN: u64 = 60;
    const NAME_POS: u64 = Self::FIXED_LEN - 1;

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.font_name.len() > u8::MAX as usize {
            return Err(crate::Error::new(
                ErrorKind::FormatDescriptionInvalid,
                format!("Font name of {} bytes doesn't fit into 255 bytes", self.font_name.len()),
            ));
        }
        Ok(())
    }
}

impl Atom for TextSampleEntry {
    const FOURCC: Fourcc = TEXT_MEDIA;
}

impl ParseAtom for TextSampleEntry {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        expect_min_size("Text sample entry (text)", size, Self::NAME_POS + 1 - 8)?;

        reader.skip(6)?; // reserved
        let data_reference_index = reader.read_be_u16()?;
        let display_flags = reader.read_be_u32()?;
        let justification = reader.read_be_u32()? as i32;
        let background_color = [reader.read_be_u16()?, reader.read_be_u16()?, reader.read_be_u16()?];
        let default_text_box = TextBox {
            top: reader.read_be_i16()?,
            left: reader.read_be_i16()?,
            bottom: reader.read_be_i16()?,
            right: reader.read_be_i16()?,
        };
        reader.skip(8)?; // reserved
        let font_number = reader.read_be_u16()?;
        let font_face = reader.read_be_u16()?;
        reader.skip(3)?; // reserved
        let foreground_color = [reader.read_be_u16()?, reader.read_be_u16()?, reader.read_be_u16()?];

        let name_len = reader.read_u8()? as u64;
        let remaining = size.content_len() - (Self::NAME_POS + 1 - 8);
        if name_len > remaining {
            return Err(crate::Error::new(
                ErrorKind::Parsing,
                format!("Font name length {name_len} exceeds the remaining {remaining} bytes"),
            ));
        }
        let font_name = reader.read_utf8(name_len)?;
        // extension atoms such as `ftab` are not interpreted
        reader.skip((remaining - name_len) as i64)?;

        Ok(Self {
            data_reference_index,
            display_flags,
            justification,
            background_color,
            default_text_box,
            font_number,
            font_face,
            foreground_color,
            font_name,
        })
    }
}

impl AtomSize for TextSampleEntry {
    fn size(&self) -> Size {
        Size::from(Self::FIXED_LEN - 8 + self.font_name.len() as u64)
    }
}

impl WriteAtom for TextSampleEntry {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.validate()?;
        self.write_head(writer)?;

        writer.write_all(&[0; 6])?;
        writer.write_be_u16(self.data_reference_index)?;
        writer.write_be_u32(self.display_flags)?;
        writer.write_be_u32(self.justification as u32)?;
        for c in self.background_color {
            writer.write_be_u16(c)?;
        }
        let b = self.default_text_box;
        for v in [b.top, b.left, b.bottom, b.right] {
            writer.write_be_i16(v)?;
        }
        writer.write_all(&[0; 8])?;
        writer.write_be_u16(self.font_number)?;
        writer.write_be_u16(self.font_face)?;
        writer.write_all(&[0; 3])?;
        for c in self.foreground_color {
            writer.write_be_u16(c)?;
        }
        writer.write_u8(self.font_name.len() as u8)?;
        writer.write_utf8(&self.font_name)?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn default_layout() {
        let buf = TextSampleEntry::default().to_bytes().unwrap();
        assert_eq!(buf.len(), 60);
        assert_eq!(&buf[0..4], &[0, 0, 0, 60]);
        assert_eq!(&buf[4..8], b"text");
        assert_eq!(&buf[8..14], &[0; 6]);
        assert_eq!(&buf[14..16], &[0, 1]);
        assert!(buf[16..].iter().all(|b| *b == 0));
    }

    #[test]
    fn named_entry() {
        let entry = TextSampleEntry {
            justification: -1,
            foreground_color: [0xFFFF; 3],
            default_text_box: TextBox { top: 0, left: 0, bottom: 60, right: 400 },
            font_name: "Helvetica".to_owned(),
            ..Default::default()
        };
        let buf = entry.to_bytes().unwrap();
        assert_eq!(buf.len(), 69);
        assert_eq!(be_int!(buf, 0, u32), Some(69));
        assert_eq!(&buf[20..24], &[0xFF; 4]);
        assert_eq!(buf[59], 9);
        assert_eq!(&buf[60..], b"Helvetica");

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        assert_eq!(TextSampleEntry::parse(&mut reader, head.size()).unwrap(), entry);
    }

    #[test]
    fn name_too_long() {
        let entry = TextSampleEntry { font_name: "x".repeat(256), ..Default::default() };
        let err = entry.to_bytes().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FormatDescriptionInvalid));
    }

    #[test]
    fn truncated_name() {
        let mut buf = TextSampleEntry::default().to_bytes().unwrap();
        buf[59] = 4;
        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        let err = TextSampleEntry::parse(&mut reader, head.size()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parsing));
    }
}
