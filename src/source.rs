use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::atom::util::{ReadUtil, SeekUtil};
use crate::atom::{head, ident, AtomBounds, FileType, Fourcc, Moov, Mvhd, ParseAtom, Trak};
use crate::{decode_text, ChapterInterval, ErrorKind, Language, Matrix, MediaType, Time, TrackId};

/// Read access to a movie that chapters are added to.
pub trait Source {
    /// Returns every track of the movie in file order.
    fn load_tracks(&self) -> crate::Result<Vec<SourceTrack>>;

    /// Returns the duration of the whole movie.
    fn load_duration(&self) -> crate::Result<Time>;

    /// Returns the transformation matrix the movie should be displayed with.
    fn load_preferred_transform(&self) -> crate::Result<Matrix>;
}

/// A track of a source movie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceTrack {
    /// The track id from the track header.
    pub id: TrackId,
    /// The media type derived from the handler.
    pub media_type: MediaType,
    /// Whether the track is enabled for playback.
    pub enabled: bool,
    /// The media timescale.
    pub timescale: u32,
    /// The media duration in the media timescale.
    pub duration: Time,
    /// The media language, `None` for legacy Macintosh language codes.
    pub language: Option<Language>,
    /// Tracks referenced as chapter lists.
    pub chapters: Vec<TrackId>,
}

/// A `trak` atom as found in the source file.
#[derive(Clone, Debug)]
pub(crate) struct RawTrack {
    pub info: SourceTrack,
    /// The bounds of the atom in the source file.
    pub bounds: AtomBounds,
    /// The whole atom including its head.
    pub data: Vec<u8>,
    /// Parsed from `data`, so all bounds are relative to the start of the atom.
    pub trak: Trak,
}

/// A QuickTime or MPEG-4 file.
///
/// Only the structure is read: the top level layout, the movie header and the tracks. Media
/// data is left on disk and copied when the movie is written.
#[derive(Clone, Debug)]
pub struct Mp4Source {
    path: Option<PathBuf>,
    file_type: Option<FileType>,
    atoms: Vec<(Fourcc, AtomBounds)>,
    moov_bounds: AtomBounds,
    moov: Moov,
    mvhd: Mvhd,
    tracks: Vec<RawTrack>,
}

impl Mp4Source {
    /// Attempts to read the movie structure from the file at the indicated path.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let mut source = Self::read_from(&mut reader)?;
        source.path = Some(path.to_path_buf());
        Ok(source)
    }

    /// Attempts to read the movie structure from the reader. A source read this way can be
    /// inspected but not written, since its media data can't be copied.
    pub fn read_from(reader: &mut (impl Read + Seek)) -> crate::Result<Self> {
        let end = reader.stream_position()? + reader.remaining_stream_len()?;

        let mut atoms = Vec::new();
        let mut file_type = None;
        let mut moov = None;

        let mut pos = reader.stream_position()?;
        while pos < end {
            let head = head::parse(reader)?;
            let bounds = head::find_bounds(reader, head.size())?;
            if bounds.end() > end {
                return Err(crate::Error::new(
                    ErrorKind::SizeMismatch,
                    format!(
                        "Atom '{}' of {} bytes exceeds the end of the file by {} bytes",
                        head.fourcc(),
                        head.len(),
                        bounds.end() - end
                    ),
                ));
            }

            match head.fourcc() {
                ident::FILETYPE if file_type.is_none() => {
                    file_type = Some(FileType::parse(reader, head.size())?);
                }
                ident::MOVIE if moov.is_none() => {
                    moov = Some((bounds, Moov::parse(reader, head.size())?));
                }
                _ => (),
            }
            head::seek_to_end(reader, &bounds)?;

            atoms.push((head.fourcc(), bounds));
            pos = bounds.end();
        }

        let Some((moov_bounds, moov)) = moov else {
            return Err(crate::Error::new(
                ErrorKind::AtomNotFound(ident::MOVIE),
                "Missing necessary data, no movie (moov) atom found",
            ));
        };
        let Some(mvhd) = moov.mvhd.clone() else {
            return Err(crate::Error::new(
                ErrorKind::AtomNotFound(ident::MOVIE_HEADER),
                "Missing necessary data, no movie header (mvhd) atom found",
            ));
        };
        if mvhd.timescale == 0 {
            return Err(crate::Error::new(ErrorKind::Parsing, "Movie timescale is zero"));
        }

        let mut tracks = Vec::new();
        for bounds in moov.tracks() {
            reader.seek(SeekFrom::Start(bounds.pos()))?;
            let data = reader.read_u8_vec(bounds.len())?;
            tracks.push(read_track(*bounds, data)?);
        }

        debug!(
            tracks = tracks.len(),
            duration = mvhd.duration,
            timescale = mvhd.timescale,
            "read source movie"
        );

        Ok(Self { path: None, file_type, atoms, moov_bounds, moov, mvhd, tracks })
    }

    /// The path the source was opened from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The file type, if the file starts with one.
    pub fn file_type(&self) -> Option<&FileType> {
        self.file_type.as_ref()
    }

    /// Returns the track with the given id.
    pub fn track(&self, id: TrackId) -> Option<&SourceTrack> {
        self.tracks.iter().map(|t| &t.info).find(|t| t.id == id)
    }

    /// Reads the chapters of the first text track referenced as chapter list by another track.
    /// Samples with an empty title, such as a filler before the first chapter, are skipped.
    pub fn read_chapters(&self) -> crate::Result<Vec<ChapterInterval>> {
        let Some(path) = &self.path else {
            return Err(crate::Error::new(
                ErrorKind::Io(std::io::ErrorKind::Unsupported.into()),
                "The source was not opened from a path",
            ));
        };
        let mut reader = BufReader::new(File::open(path)?);
        self.read_chapters_from(&mut reader)
    }

    /// Reads the chapters like [`Self::read_chapters`], taking the media data from the reader.
    pub fn read_chapters_from(
        &self,
        reader: &mut (impl Read + Seek),
    ) -> crate::Result<Vec<ChapterInterval>> {
        let chapter_track = self
            .tracks
            .iter()
            .flat_map(|t| t.info.chapters.iter())
            .filter_map(|id| self.raw_track(*id))
            .find(|t| t.info.media_type == MediaType::Text);
        let Some(track) = chapter_track else {
            return Ok(Vec::new());
        };

        let timescale = track.info.timescale;
        let mut chapters = Vec::new();
        let mut start = 0i64;
        for (duration, payload) in read_samples(reader, track)? {
            let title = decode_text(&payload)?.text;
            if !title.is_empty() {
                chapters.push(ChapterInterval {
                    title,
                    start: Time::new(start, timescale),
                    duration: Time::new(duration as i64, timescale),
                    marker_index: chapters.len(),
                });
            }
            start += duration as i64;
        }

        Ok(chapters)
    }

    /// Reads the payload of every sample of a track, in decoding order.
    pub fn read_payloads(&self, id: TrackId) -> crate::Result<Vec<Vec<u8>>> {
        let Some(path) = &self.path else {
            return Err(crate::Error::new(
                ErrorKind::Io(std::io::ErrorKind::Unsupported.into()),
                "The source was not opened from a path",
            ));
        };
        let Some(track) = self.raw_track(id) else {
            return Err(crate::Error::new(
                ErrorKind::Parsing,
                format!("The source has no track {id}"),
            ));
        };

        let mut reader = BufReader::new(File::open(path)?);
        let samples = read_samples(&mut reader, track)?;
        Ok(samples.into_iter().map(|(_, p)| p).collect())
    }

    pub(crate) fn raw_track(&self, id: TrackId) -> Option<&RawTrack> {
        self.tracks.iter().find(|t| t.info.id == id)
    }

    pub(crate) fn raw_tracks(&self) -> impl Iterator<Item = &RawTrack> {
        self.tracks.iter()
    }

    pub(crate) fn top_level_atoms(&self) -> &[(Fourcc, AtomBounds)] {
        &self.atoms
    }

    pub(crate) fn moov_bounds(&self) -> AtomBounds {
        self.moov_bounds
    }

    pub(crate) fn moov(&self) -> &Moov {
        &self.moov
    }

    pub(crate) fn mvhd(&self) -> &Mvhd {
        &self.mvhd
    }
}

impl Source for Mp4Source {
    fn load_tracks(&self) -> crate::Result<Vec<SourceTrack>> {
        Ok(self.tracks.iter().map(|t| t.info.clone()).collect())
    }

    fn load_duration(&self) -> crate::Result<Time> {
        let value = i64::try_from(self.mvhd.duration).unwrap_or(i64::MAX);
        Ok(Time::new(value, self.mvhd.timescale))
    }

    fn load_preferred_transform(&self) -> crate::Result<Matrix> {
        Ok(self.mvhd.matrix)
    }
}

/// Reads the duration and payload of every sample of a track.
fn read_samples(
    reader: &mut (impl Read + Seek),
    track: &RawTrack,
) -> crate::Result<Vec<(u32, Vec<u8>)>> {
    let id = track.info.id;
    let Some(stbl) = track.trak.stbl() else {
        return Err(crate::Error::new(
            ErrorKind::AtomNotFound(ident::SAMPLE_TABLE),
            format!("Track {id} has no sample table"),
        ));
    };
    let missing = |fourcc: Fourcc| {
        crate::Error::new(
            ErrorKind::AtomNotFound(fourcc),
            format!("Track {id} has no '{fourcc}' atom"),
        )
    };
    let stts = stbl.stts.as_ref().ok_or_else(|| missing(ident::SAMPLE_TABLE_TIME_TO_SAMPLE))?;
    let stsc = stbl.stsc.as_ref().ok_or_else(|| missing(ident::SAMPLE_TABLE_SAMPLE_TO_CHUNK))?;
    let stsz = stbl.stsz.as_ref().ok_or_else(|| missing(ident::SAMPLE_TABLE_SAMPLE_SIZE))?;
    let offsets = stbl.chunk_offsets().ok_or_else(|| missing(ident::SAMPLE_TABLE_CHUNK_OFFSET))?;

    let stream_len = reader.seek(SeekFrom::End(0))?;
    let mut durations = stts.durations();
    let mut samples = Vec::new();
    let mut sample = 0;
    for (chunk, count) in stsc.samples_per_chunk(offsets.len() as u32).into_iter().enumerate() {
        let Some(mut offset) = offsets.get(chunk) else {
            break;
        };
        for _ in 0..count {
            let (Some(size), Some(duration)) = (stsz.sample_size(sample), durations.next()) else {
                return Ok(samples);
            };

            let end = offset.checked_add(size as u64).filter(|e| *e <= stream_len);
            let Some(end) = end else {
                return Err(crate::Error::new(
                    ErrorKind::Parsing,
                    format!(
                        "Sample {sample} of track {id} at {offset} with {size} bytes exceeds the \
                         end of the file at {stream_len}"
                    ),
                ));
            };

            reader.seek(SeekFrom::Start(offset))?;
            samples.push((duration, reader.read_u8_vec(size as u64)?));
            offset = end;
            sample += 1;
        }
    }

    Ok(samples)
}

fn read_track(bounds: AtomBounds, data: Vec<u8>) -> crate::Result<RawTrack> {
    let mut cursor = Cursor::new(&data);
    let head = head::parse(&mut cursor)?;
    let trak = Trak::parse(&mut cursor, head.size())?;

    let Some(tkhd) = &trak.tkhd else {
        return Err(crate::Error::new(
            ErrorKind::AtomNotFound(ident::TRACK_HEADER),
            "Missing necessary data, no track header (tkhd) atom found",
        ));
    };
    let Some(mdhd) = trak.mdia.as_ref().and_then(|m| m.mdhd.as_ref()) else {
        return Err(crate::Error::new(
            ErrorKind::AtomNotFound(ident::MEDIA_HEADER),
            format!("Missing necessary data, track {} has no media header (mdhd)", tkhd.id),
        ));
    };
    if tkhd.id == 0 || mdhd.timescale == 0 {
        return Err(crate::Error::new(
            ErrorKind::Parsing,
            format!("Track {} has an invalid id or a timescale of zero", tkhd.id),
        ));
    }

    let media_type =
        trak.handler_type().map_or(MediaType::Other(Fourcc::default()), MediaType::from_handler);
    let chapters = trak
        .tref
        .as_ref()
        .map(|t| t.ids(ident::CHAPTER_REFERENCE).map(TrackId).collect())
        .unwrap_or_default();

    let info = SourceTrack {
        id: TrackId(tkhd.id),
        media_type,
        enabled: tkhd.enabled(),
        timescale: mdhd.timescale,
        duration: Time::new(i64::try_from(mdhd.duration).unwrap_or(i64::MAX), mdhd.timescale),
        language: Language::from_packed(mdhd.language),
        chapters,
    };

    Ok(RawTrack { info, bounds, data, trak })
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::atom::Stsz;
    use crate::{Finalizer, Movie, Mp4Finalizer, SampleDescription, WriteConfig};

    #[test]
    fn huge_extended_length() {
        let mut buf = vec![0, 0, 0, 8, b'f', b'r', b'e', b'e', 0, 0, 0, 1, b'f', b'r', b'e', b'e'];
        buf.extend_from_slice(&[0xFF; 8]);

        let err = Mp4Source::read_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidAtomSize));
    }

    #[test]
    fn sample_sizes_beyond_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.mov");
        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let text = movie.add_track(MediaType::Text, 600, None).unwrap();
        movie.set_media_data_destination(text, &path).unwrap();
        let desc = Arc::new(SampleDescription::Text(Default::default()));
        let payload = crate::encode_text("one", false).unwrap();
        movie.append_sample(text, payload, &desc, Time::zero(1), Time::from_secs(1)).unwrap();
        Mp4Finalizer.write_header(&movie, &path, &WriteConfig::DEFAULT).unwrap();

        let buf = std::fs::read(&path).unwrap();
        let source = Mp4Source::read_from(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(source.read_payloads(text).unwrap().len(), 1);

        // claim a single sample of almost 4 GiB
        let mut source = source;
        let raw = source.tracks.iter_mut().find(|t| t.info.id == text).unwrap();
        let minf = raw.trak.mdia.as_mut().and_then(|m| m.minf.as_mut()).unwrap();
        minf.stbl.as_mut().unwrap().stsz = Some(Stsz::from_sizes(vec![u32::MAX]));

        let err = source.read_chapters_from(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parsing));
    }
}
