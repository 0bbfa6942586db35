use super::*;
use crate::Matrix;

/// Track header.
///
/// ```md
/// 1 byte version
/// 3 bytes flags (bit 0 enabled, bit 1 in movie, bit 2 in preview)
/// 4/8 bytes creation time
/// 4/8 bytes modification time
/// 4 bytes track id
/// 4 bytes reserved
/// 4/8 bytes duration
/// 8 bytes reserved
/// 2 bytes layer
/// 2 bytes alternate group
/// 2 bytes volume
/// 2 bytes reserved
/// 36 bytes matrix
/// 4 bytes width (16.16)
/// 4 bytes height (16.16)
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tkhd {
    pub version: u8,
    pub flags: [u8; 3],
    pub creation_time: u64,
    pub modification_time: u64,
    pub id: u32,
    /// The duration in mvhd timescale units.
    pub duration: u64,
    pub layer: i16,
    pub alternate_group: i16,
    pub volume: u16,
    pub matrix: Matrix,
    pub width: u32,
    pub height: u32,
}

impl Atom for Tkhd {
    const FOURCC: Fourcc = TRACK_HEADER;
}

impl ParseAtom for Tkhd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut tkhd = Self::default();

        let (version, flags) = head::parse_full(reader)?;
        tkhd.version = version;
        tkhd.flags = flags;
        match version {
            0 => {
                expect_size("Track header (tkhd)", size, 84)?;
                tkhd.creation_time = reader.read_be_u32()? as u64;
                tkhd.modification_time = reader.read_be_u32()? as u64;
                tkhd.id = reader.read_be_u32()?;
                reader.skip(4)?;
                tkhd.duration = reader.read_be_u32()? as u64;
            }
            1 => {
                expect_size("Track header (tkhd)", size, 96)?;
                tkhd.creation_time = reader.read_be_u64()?;
                tkhd.modification_time = reader.read_be_u64()?;
                tkhd.id = reader.read_be_u32()?;
                reader.skip(4)?;
                tkhd.duration = reader.read_be_u64()?;
            }
            v => return unknown_version("track header (tkhd)", v),
        }
        reader.skip(8)?;
        tkhd.layer = reader.read_be_i16()?;
        tkhd.alternate_group = reader.read_be_i16()?;
        tkhd.volume = reader.read_be_u16()?;
        reader.skip(2)?;
        for row in tkhd.matrix.0.iter_mut() {
            for i in row.iter_mut() {
                *i = reader.read_be_u32()?;
            }
        }
        tkhd.width = reader.read_be_u32()?;
        tkhd.height = reader.read_be_u32()?;

        Ok(tkhd)
    }
}

impl AtomSize for Tkhd {
    fn size(&self) -> Size {
        match self.version {
            0 => Size::from(84),
            _ => Size::from(96),
        }
    }
}

impl WriteAtom for Tkhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, self.version, self.flags)?;

        match self.version {
            0 => {
                writer.write_be_u32(self.creation_time as u32)?;
                writer.write_be_u32(self.modification_time as u32)?;
                writer.write_be_u32(self.id)?;
                writer.write_be_u32(0)?;
                writer.write_be_u32(self.duration as u32)?;
            }
            1 => {
                writer.write_be_u64(self.creation_time)?;
                writer.write_be_u64(self.modification_time)?;
                writer.write_be_u32(self.id)?;
                writer.write_be_u32(0)?;
                writer.write_be_u64(self.duration)?;
            }
            v => return unknown_version("track header (tkhd)", v),
        }
        writer.write_all(&[0; 8])?;
        writer.write_be_i16(self.layer)?;
        writer.write_be_i16(self.alternate_group)?;
        writer.write_be_u16(self.volume)?;
        writer.write_be_u16(0)?;
        for row in self.matrix.0 {
            for i in row {
                writer.write_be_u32(i)?;
            }
        }
        writer.write_be_u32(self.width)?;
        writer.write_be_u32(self.height)?;

        Ok(())
    }
}

impl Tkhd {
    pub const FLAG_ENABLED: u8 = 0x01;
    pub const FLAG_IN_MOVIE: u8 = 0x02;
    pub const FLAG_IN_PREVIEW: u8 = 0x04;

    pub fn enabled(&self) -> bool {
        self.flags[2] & Self::FLAG_ENABLED != 0
    }

    /// Sets the duration, switching to version 1 if it doesn't fit into 32 bits.
    pub fn set_duration(&mut self, duration: u64) {
        self.duration = duration;
        if duration > u32::MAX as u64 {
            self.version = 1;
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parse_written() {
        let tkhd = Tkhd {
            flags: [0, 0, Tkhd::FLAG_IN_MOVIE],
            id: 3,
            duration: 90_000,
            layer: -1,
            matrix: Matrix::IDENTITY,
            width: 320 << 16,
            height: 180 << 16,
            ..Default::default()
        };
        let buf = tkhd.to_bytes().unwrap();
        assert_eq!(buf.len(), 92);

        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        let parsed = Tkhd::parse(&mut reader, head.size()).unwrap();
        assert_eq!(parsed, tkhd);
        assert!(!parsed.enabled());
    }
}
