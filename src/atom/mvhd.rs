use super::*;
use crate::Matrix;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mvhd {
    pub version: u8,
    pub flags: [u8; 3],
    pub creation_time: u64,
    pub modification_time: u64,
    pub timescale: u32,
    /// The duration in `timescale` units.
    pub duration: u64,
    pub preferred_rate: u32,
    pub preferred_volume: u16,
    pub matrix: Matrix,
    pub preview_time: u32,
    pub preview_duration: u32,
    pub poster_time: u32,
    pub selection_time: u32,
    pub selection_duration: u32,
    pub current_time: u32,
    pub next_track_id: u32,
}

impl Atom for Mvhd {
    const FOURCC: Fourcc = MOVIE_HEADER;
}

impl ParseAtom for Mvhd {
    fn parse_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self> {
        let mut mvhd = Self::default();

        let (version, flags) = head::parse_full(reader)?;
        mvhd.version = version;
        mvhd.flags = flags;
        match version {
            0 => {
                expect_size("Movie header (mvhd)", size, 100)?;
                mvhd.creation_time = reader.read_be_u32()? as u64;
                mvhd.modification_time = reader.read_be_u32()? as u64;
                mvhd.timescale = reader.read_be_u32()?;
                mvhd.duration = reader.read_be_u32()? as u64;
            }
            1 => {
                expect_size("Movie header (mvhd)", size, 112)?;
                mvhd.creation_time = reader.read_be_u64()?;
                mvhd.modification_time = reader.read_be_u64()?;
                mvhd.timescale = reader.read_be_u32()?;
                mvhd.duration = reader.read_be_u64()?;
            }
            v => return unknown_version("movie header (mvhd)", v),
        }
        mvhd.preferred_rate = reader.read_be_u32()?;
        mvhd.preferred_volume = reader.read_be_u16()?;
        reader.skip(10)?; // reserved
        for row in mvhd.matrix.0.iter_mut() {
            for i in row.iter_mut() {
                *i = reader.read_be_u32()?;
            }
        }
        mvhd.preview_time = reader.read_be_u32()?;
        mvhd.preview_duration = reader.read_be_u32()?;
        mvhd.poster_time = reader.read_be_u32()?;
        mvhd.selection_time = reader.read_be_u32()?;
        mvhd.selection_duration = reader.read_be_u32()?;
        mvhd.current_time = reader.read_be_u32()?;
        mvhd.next_track_id = reader.read_be_u32()?;

        Ok(mvhd)
    }
}

impl AtomSize for Mvhd {
    fn size(&self) -> Size {
        match self.version {
            0 => Size::from(100),
            _ => Size::from(112),
        }
    }
}

impl WriteAtom for Mvhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, self.version, self.flags)?;

        match self.version {
            0 => {
                writer.write_be_u32(self.creation_time as u32)?;
                writer.write_be_u32(self.modification_time as u32)?;
                writer.write_be_u32(self.timescale)?;
                writer.write_be_u32(self.duration as u32)?;
            }
            1 => {
                writer.write_be_u64(self.creation_time)?;
                writer.write_be_u64(self.modification_time)?;
                writer.write_be_u32(self.timescale)?;
                writer.write_be_u64(self.duration)?;
            }
            v => return unknown_version("movie header (mvhd)", v),
        }
        writer.write_be_u32(self.preferred_rate)?;
        writer.write_be_u16(self.preferred_volume)?;
        writer.write_all(&[0; 10])?; // reserved
        for row in self.matrix.0 {
            for i in row {
                writer.write_be_u32(i)?;
            }
        }
        writer.write_be_u32(self.preview_time)?;
        writer.write_be_u32(self.preview_duration)?;
        writer.write_be_u32(self.poster_time)?;
        writer.write_be_u32(self.selection_time)?;
        writer.write_be_u32(self.selection_duration)?;
        writer.write_be_u32(self.current_time)?;
        writer.write_be_u32(self.next_track_id)?;

        Ok(())
    }
}

impl Mvhd {
    /// A fresh movie header for a movie that is written without a source.
    pub fn new(timescale: u32, matrix: Matrix) -> Self {
        Self {
            timescale,
            preferred_rate: 0x0001_0000,
            preferred_volume: 0x0100,
            matrix,
            next_track_id: 1,
            ..Default::default()
        }
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
    fn version_upgrade() {
        let mut mvhd = Mvhd::new(600, Matrix::IDENTITY);
        mvhd.set_duration(u32::MAX as u64 + 1);
        assert_eq!(mvhd.version, 1);

        let buf = mvhd.to_bytes().unwrap();
        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        let parsed = Mvhd::parse(&mut reader, head.size()).unwrap();
        assert_eq!(parsed, mvhd);
    }
}
