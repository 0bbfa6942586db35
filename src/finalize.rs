//! Writing a [`Movie`] to disk.
//!
//! The output keeps every top level atom of the source in order. `ftyp` and `moov` are rebuilt
//! in place, everything else is copied verbatim, and the samples of new tracks are appended in a
//! single `mdat` at the end of the file, one chunk per track. Chunk offsets of copied tracks are
//! shifted by the size change of every rebuilt atom preceding them.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, trace};

use crate::atom::{
    ident, AtomBounds, AtomSize, Co64, Dinf, FileType, Gmhd, Gmin, Hdlr, Head, LenOrZero, Mdat,
    Mdhd, Mdia, Minf, Mvhd, Size, Stbl, Stco, Stsc, Stsd, Stsz, Stts, Tkhd, Trak, Tref, Vmhd,
    WriteAtom,
};
use crate::link::AssociationKind;
use crate::source::RawTrack;
use crate::{ErrorKind, MediaType, Movie, Track, TrackId, WriteConfig};

/// Commits a movie to a file.
pub trait Finalizer {
    /// Writes the movie header and the media data of new tracks to `destination`. This is the
    /// only step that touches the destination.
    fn write_header(&self, movie: &Movie, destination: &Path, cfg: &WriteConfig)
        -> crate::Result<()>;
}

/// Writes QuickTime and MPEG-4 files.
///
/// The file is written to a temporary file in the destination's directory which replaces the
/// destination once it is complete. A failed write leaves the destination untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mp4Finalizer;

impl Finalizer for Mp4Finalizer {
    fn write_header(
        &self,
        movie: &Movie,
        destination: &Path,
        cfg: &WriteConfig,
    ) -> crate::Result<()> {
        let new_tracks = check_new_tracks(movie, destination)?;

        let file_type = match (&cfg.file_type, movie.file_type(), movie.source()) {
            (Some(f), _, _) | (None, Some(f), _) => Some(f.clone()),
            (None, None, Some(_)) => None,
            (None, None, None) => Some(FileType::quicktime()),
        };
        // files without a file type are classic QuickTime movies
        let quicktime = file_type.as_ref().map_or(true, FileType::is_quicktime);
        let ftyp = file_type.as_ref().map(|f| f.to_bytes()).transpose()?;

        let mut large_offsets = false;
        let layout = loop {
            let layout =
                Layout::plan(movie, cfg, &new_tracks, ftyp.as_deref(), quicktime, large_offsets)?;
            if !large_offsets && layout.chunk_offsets.iter().any(|o| *o > u32::MAX as u64) {
                debug!("new media data lies beyond 4 GiB, switching to 64 bit chunk offsets");
                large_offsets = true;
                continue;
            }
            break layout;
        };

        let parts = layout.finish(movie, cfg, &new_tracks, ftyp, quicktime, large_offsets)?;
        commit(movie, destination, &parts).map_err(|e| match e.kind {
            ErrorKind::Io(_) => crate::Error::new(
                ErrorKind::FinalizationFailed,
                format!("Error writing {}: {}", destination.display(), e.description),
            ),
            _ => e,
        })
    }
}

/// A piece of the output file.
#[derive(Debug)]
enum Part<'a> {
    Bytes(Vec<u8>),
    /// A byte range of the source file, copied verbatim.
    Source(AtomBounds),
    /// The samples of a new track, forming a single chunk.
    Samples(&'a Track),
}

impl Part<'_> {
    fn len(&self) -> u64 {
        match self {
            Self::Bytes(b) => b.len() as u64,
            Self::Source(b) => b.len(),
            Self::Samples(t) => media_len(t),
        }
    }
}

/// A copied track whose references are about to change.
#[derive(Debug)]
struct CopiedTrak<'a> {
    raw: &'a RawTrack,
    /// The new references if they differ from the existing ones.
    tref: Option<Option<Tref>>,
}

impl CopiedTrak<'_> {
    fn len(&self) -> u64 {
        match &self.tref {
            None => self.raw.bounds.len(),
            Some(tref) => trak_size(self.raw, tref).len(),
        }
    }
}

/// The positions of everything that is written.
struct Layout<'a> {
    copied: Vec<CopiedTrak<'a>>,
    /// `(old end, size change)` of every rebuilt or inserted top level atom.
    deltas: Vec<(u64, i64)>,
    /// One offset per new track.
    chunk_offsets: Vec<u64>,
}

impl<'a> Layout<'a> {
    fn plan(
        movie: &'a Movie,
        cfg: &WriteConfig,
        new_tracks: &[(TrackId, &Track)],
        ftyp: Option<&[u8]>,
        quicktime: bool,
        large_offsets: bool,
    ) -> crate::Result<Self> {
        let copied = copied_traks(movie, cfg)?;

        // chunk offsets don't change the size of a table
        let offsets = vec![0; new_tracks.len()];
        let traks = new_traks(movie, new_tracks, &offsets, quicktime, large_offsets)?;
        let moov_len = Size::from(
            moov_children_len(movie, &copied)?
                + traks.iter().map(|t| t.len()).sum::<u64>(),
        )
        .len();

        let ftyp_len = ftyp.map_or(0, |f| f.len() as u64);
        let mut deltas = Vec::new();
        let mut end = 0;
        match movie.source() {
            Some(source) => {
                let mut ftyp_replaced = false;
                if source.file_type().is_none() && ftyp.is_some() {
                    deltas.push((0, ftyp_len as i64));
                    end += ftyp_len;
                }
                for (fourcc, bounds) in source.top_level_atoms() {
                    let new_len = match *fourcc {
                        ident::FILETYPE if !ftyp_replaced && ftyp.is_some() => {
                            ftyp_replaced = true;
                            ftyp_len
                        }
                        ident::MOVIE if *bounds == source.moov_bounds() => moov_len,
                        _ => bounds.len(),
                    };
                    if new_len != bounds.len() {
                        deltas.push((bounds.end(), new_len as i64 - bounds.len() as i64));
                    }
                    end += new_len;
                }
            }
            None => end = ftyp_len + moov_len,
        }

        let total_media_len: u64 = new_tracks.iter().map(|(_, t)| media_len(t)).sum();
        let mut chunk_offsets = Vec::with_capacity(new_tracks.len());
        let mut pos = end + Mdat::head(total_media_len).head_len();
        for (id, track) in new_tracks {
            trace!(track_id = id.0, offset = pos, "placing chunk");
            chunk_offsets.push(pos);
            pos += media_len(track);
        }

        Ok(Self { copied, deltas, chunk_offsets })
    }

    /// Returns the shift of an offset into the source file.
    fn shift(&self, offset: u64) -> i64 {
        self.deltas.iter().filter(|(end, _)| *end <= offset).map(|(_, d)| *d).sum()
    }

    fn finish(
        self,
        movie: &'a Movie,
        cfg: &WriteConfig,
        new_tracks: &[(TrackId, &'a Track)],
        ftyp: Option<Vec<u8>>,
        quicktime: bool,
        large_offsets: bool,
    ) -> crate::Result<Vec<Part<'a>>> {
        let traks = new_traks(movie, new_tracks, &self.chunk_offsets, quicktime, large_offsets)?;

        let mut moov = Vec::new();
        moov.push(Part::Bytes(mvhd(movie)?.to_bytes()?));
        if let Some(source) = movie.source() {
            for (fourcc, bounds) in source.moov().children.iter() {
                match *fourcc {
                    ident::MOVIE_HEADER => (),
                    ident::TRACK => {
                        let copied = self.copied.iter().find(|c| c.raw.bounds == *bounds);
                        if let Some(copied) = copied {
                            moov.push(Part::Bytes(self.copied_trak_bytes(copied)?));
                        }
                    }
                    _ => moov.push(Part::Source(*bounds)),
                }
            }
        }
        for trak in traks.iter() {
            moov.push(Part::Bytes(trak.to_bytes()?));
        }

        let moov_content_len: u64 = moov.iter().map(Part::len).sum();
        let mut moov_head = Vec::new();
        crate::atom::head::write(
            &mut moov_head,
            Head::from(Size::from(moov_content_len), ident::MOVIE),
        )?;
        moov.insert(0, Part::Bytes(moov_head));

        let mut parts = Vec::new();
        match movie.source() {
            Some(source) => {
                let mut ftyp = ftyp;
                if source.file_type().is_none() {
                    if let Some(ftyp) = ftyp.take() {
                        parts.push(Part::Bytes(ftyp));
                    }
                }
                for (fourcc, bounds) in source.top_level_atoms() {
                    match *fourcc {
                        ident::FILETYPE if ftyp.is_some() => {
                            if let Some(ftyp) = ftyp.take() {
                                parts.push(Part::Bytes(ftyp));
                            }
                        }
                        ident::MOVIE if *bounds == source.moov_bounds() => {
                            parts.append(&mut moov);
                        }
                        _ => parts.push(Part::Source(*bounds)),
                    }
                }
            }
            None => {
                if let Some(ftyp) = ftyp {
                    parts.push(Part::Bytes(ftyp));
                }
                parts.append(&mut moov);
            }
        }

        let total_media_len: u64 = new_tracks.iter().map(|(_, t)| media_len(t)).sum();
        if total_media_len > 0 {
            let mut mdat_head = Vec::new();
            Mdat::write_head(&mut mdat_head, total_media_len)?;
            parts.push(Part::Bytes(mdat_head));
            parts.extend(new_tracks.iter().map(|(_, t)| Part::Samples(*t)));
        }

        debug!(
            parts = parts.len(),
            len = parts.iter().map(Part::len).sum::<u64>(),
            copied_tracks = self.copied.len(),
            new_tracks = new_tracks.len(),
            keep_references = cfg.keep_references,
            "planned output layout"
        );
        Ok(parts)
    }

    /// Returns the bytes of a copied track with shifted chunk offsets and updated references.
    fn copied_trak_bytes(&self, copied: &CopiedTrak) -> crate::Result<Vec<u8>> {
        let raw = copied.raw;
        let mut data = raw.data.clone();
        if let Some(offsets) = raw.trak.stbl().and_then(|s| s.chunk_offsets()) {
            offsets.shift_in_place(&mut data, |o| self.shift(o))?;
        }

        match &copied.tref {
            None => Ok(data),
            Some(tref) => {
                let size = trak_size(raw, tref);
                let mut buf = Vec::with_capacity(size.len() as usize);
                crate::atom::head::write(&mut buf, Head::from(size, ident::TRACK))?;

                let mut tref_written = false;
                let mut write_tref = |buf: &mut Vec<u8>| -> crate::Result<()> {
                    if !tref_written {
                        tref_written = true;
                        if let Some(t) = tref {
                            t.write(buf)?;
                        }
                    }
                    Ok(())
                };
                for (fourcc, bounds) in raw.trak.children.iter() {
                    match *fourcc {
                        ident::TRACK_REFERENCE => write_tref(&mut buf)?,
                        ident::MEDIA => {
                            write_tref(&mut buf)?;
                            buf.extend_from_slice(&data[bounds.range()]);
                        }
                        _ => buf.extend_from_slice(&data[bounds.range()]),
                    }
                }
                write_tref(&mut buf)?;

                Ok(buf)
            }
        }
    }
}

/// Checks that all new tracks can be written to `destination`.
fn check_new_tracks<'a>(
    movie: &'a Movie,
    destination: &Path,
) -> crate::Result<Vec<(TrackId, &'a Track)>> {
    let failed = |msg: String| crate::Error::new(ErrorKind::FinalizationFailed, msg);

    let mut tracks = Vec::new();
    for (id, track) in movie.tracks() {
        if track.media_data_destination() != Some(destination) {
            return Err(failed(format!(
                "The media data of track {id} is not bound to {}",
                destination.display()
            )));
        }

        let samples = track.samples();
        let Some(first) = samples.first() else {
            return Err(failed(format!("Track {id} has no samples")));
        };
        if !first.pts.is_zero() {
            return Err(failed(format!(
                "Track {id} starts at {:.3}s instead of zero",
                first.pts.as_secs_f64()
            )));
        }
        if let Some(pair) = samples.windows(2).find(|p| p[0].end() != p[1].pts) {
            return Err(failed(format!(
                "Track {id} has a gap between {:.3}s and {:.3}s",
                pair[0].end().as_secs_f64(),
                pair[1].pts.as_secs_f64()
            )));
        }

        tracks.push((id, track));
    }
    Ok(tracks)
}

fn copied_traks<'a>(movie: &'a Movie, cfg: &WriteConfig) -> crate::Result<Vec<CopiedTrak<'a>>> {
    let Some(source) = movie.source() else {
        return Ok(Vec::new());
    };

    let present: Vec<u32> =
        movie.copied_tracks().chain(movie.tracks().map(|(id, _)| id)).map(|id| id.0).collect();

    let mut copied = Vec::new();
    for id in movie.copied_tracks() {
        let Some(raw) = source.raw_track(id) else {
            return Err(crate::Error::new(
                ErrorKind::FinalizationFailed,
                format!("Copied track {id} is missing from the source"),
            ));
        };

        let mut tref = match (&raw.trak.tref, cfg.keep_references) {
            (Some(existing), true) => {
                let mut tref = existing.clone();
                for r in tref.references.iter_mut() {
                    r.track_ids.retain(|i| present.contains(i));
                }
                tref.references.retain(|r| !r.track_ids.is_empty());
                tref
            }
            _ => Tref::default(),
        };
        for to in movie.associated(id, AssociationKind::ChapterList) {
            tref.insert(AssociationKind::ChapterList.fourcc(), to.0);
        }

        let tref = (!tref.is_empty()).then_some(tref);
        let changed = tref != raw.trak.tref;
        if changed {
            trace!(track_id = id.0, "rewriting track references");
        }
        copied.push(CopiedTrak { raw, tref: changed.then_some(tref) });
    }
    Ok(copied)
}

fn trak_size(raw: &RawTrack, tref: &Option<Tref>) -> Size {
    let old_tref_len: u64 = raw
        .trak
        .children
        .iter()
        .filter(|(f, _)| *f == ident::TRACK_REFERENCE)
        .map(|(_, b)| b.len())
        .sum();
    Size::from(raw.bounds.content_len() - old_tref_len + tref.len_or_zero())
}

/// The length of all children of the new `moov` atom, except the new tracks.
fn moov_children_len(movie: &Movie, copied: &[CopiedTrak]) -> crate::Result<u64> {
    let mut len = mvhd(movie)?.len();
    if let Some(source) = movie.source() {
        for (fourcc, bounds) in source.moov().children.iter() {
            len += match *fourcc {
                ident::MOVIE_HEADER => 0,
                ident::TRACK => copied
                    .iter()
                    .find(|c| c.raw.bounds == *bounds)
                    .map_or(0, CopiedTrak::len),
                _ => bounds.len(),
            };
        }
    }
    Ok(len)
}

fn mvhd(movie: &Movie) -> crate::Result<Mvhd> {
    let mut mvhd = match movie.source() {
        Some(source) => source.mvhd().clone(),
        None => Mvhd::new(movie.timescale(), movie.transform()),
    };

    let duration = movie.duration()?;
    mvhd.set_duration(duration.value.max(0) as u64);

    let max_id = movie
        .copied_tracks()
        .chain(movie.tracks().map(|(id, _)| id))
        .map(|id| id.0)
        .max()
        .unwrap_or(0);
    mvhd.next_track_id = mvhd.next_track_id.max(max_id.saturating_add(1));
    Ok(mvhd)
}

fn media_len(track: &Track) -> u64 {
    track.samples().iter().map(|s| s.payload.len() as u64).sum()
}

fn new_traks(
    movie: &Movie,
    tracks: &[(TrackId, &Track)],
    chunk_offsets: &[u64],
    quicktime: bool,
    large_offsets: bool,
) -> crate::Result<Vec<Trak>> {
    tracks
        .iter()
        .zip(chunk_offsets)
        .map(|((id, track), offset)| new_trak(movie, *id, track, *offset, quicktime, large_offsets))
        .collect()
}

fn new_trak(
    movie: &Movie,
    id: TrackId,
    track: &Track,
    chunk_offset: u64,
    quicktime: bool,
    large_offsets: bool,
) -> crate::Result<Trak> {
    let media_duration = track.end();
    let movie_duration = media_duration.rescale(movie.timescale()).ok_or_else(|| {
        crate::Error::new(
            ErrorKind::FinalizationFailed,
            format!("Track {id} ends beyond the range of the movie timescale"),
        )
    })?;

    let media_type = track.media_type();
    let (width, height) = track.dimensions();
    let mut tkhd = Tkhd {
        flags: match track.is_enabled() {
            true => [0, 0, Tkhd::FLAG_ENABLED | Tkhd::FLAG_IN_MOVIE],
            false => [0; 3],
        },
        id: id.0,
        volume: if media_type == MediaType::Audio { 0x0100 } else { 0 },
        matrix: match media_type {
            MediaType::Video => movie.transform(),
            _ => Default::default(),
        },
        width: width << 16,
        height: height << 16,
        ..Default::default()
    };
    tkhd.set_duration(movie_duration.value.max(0) as u64);

    let mut tref = Tref::default();
    for to in movie.associated(id, AssociationKind::ChapterList) {
        tref.insert(AssociationKind::ChapterList.fourcc(), to.0);
    }

    let language = track.language().unwrap_or_default();
    let mdhd = Mdhd::new(track.timescale(), media_duration.value.max(0) as u64, language.code());
    let hdlr = Hdlr::media(media_type.handler_type(), handler_name(media_type), quicktime);

    let samples = track.samples();
    let stsd = Stsd { entries: track.description().map(|d| (**d).clone()).into_iter().collect() };
    let stts = Stts::from_durations(samples.iter().map(|s| s.duration.value as u32));
    let stsz = Stsz::from_sizes(samples.iter().map(|s| s.payload.len() as u32).collect());
    let (stco, co64) = match large_offsets {
        true => (None, Some(Co64 { bounds: None, offsets: vec![chunk_offset] })),
        false => (Some(Stco { bounds: None, offsets: vec![chunk_offset as u32] }), None),
    };
    let stbl = Stbl {
        stsd: Some(stsd),
        stts: Some(stts),
        stsc: Some(Stsc::single_chunk(samples.len() as u32)),
        stsz: Some(stsz),
        stco,
        co64,
    };

    let minf = match media_type {
        MediaType::Video => Minf {
            vmhd: Some(Vmhd::chapter()),
            gmhd: None,
            dinf: Some(Dinf::self_contained()),
            stbl: Some(stbl),
        },
        MediaType::Text => Minf {
            vmhd: None,
            gmhd: Some(Gmhd::chapter()),
            dinf: Some(Dinf::self_contained()),
            stbl: Some(stbl),
        },
        _ => Minf {
            vmhd: None,
            gmhd: Some(Gmhd { gmin: Some(Gmin::chapter()), text: None }),
            dinf: Some(Dinf::self_contained()),
            stbl: Some(stbl),
        },
    };

    Ok(Trak {
        tkhd: Some(tkhd),
        tref: (!tref.is_empty()).then_some(tref),
        mdia: Some(Mdia { mdhd: Some(mdhd), hdlr: Some(hdlr), minf: Some(minf) }),
        children: Vec::new(),
    })
}

fn handler_name(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Video => "VideoHandler",
        MediaType::Audio => "SoundHandler",
        MediaType::Text => "TextHandler",
        MediaType::Other(_) => "DataHandler",
    }
}

fn commit(movie: &Movie, destination: &Path, parts: &[Part]) -> crate::Result<()> {
    let dir = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;

    let needs_source = parts.iter().any(|p| matches!(p, Part::Source(_)));
    let mut reader = match movie.source().and_then(|s| s.path()) {
        Some(path) if needs_source => Some(BufReader::new(File::open(path)?)),
        _ => None,
    };

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        for part in parts {
            match part {
                Part::Bytes(bytes) => writer.write_all(bytes)?,
                Part::Source(bounds) => {
                    let Some(reader) = &mut reader else {
                        return Err(crate::Error::new(
                            ErrorKind::FinalizationFailed,
                            "The source was not opened from a path, its data can't be copied",
                        ));
                    };
                    reader.seek(SeekFrom::Start(bounds.pos()))?;
                    let copied = io::copy(&mut reader.by_ref().take(bounds.len()), &mut writer)?;
                    if copied != bounds.len() {
                        return Err(crate::Error::new(
                            ErrorKind::FinalizationFailed,
                            format!(
                                "The source ended after {copied} of {} bytes at {}",
                                bounds.len(),
                                bounds.pos()
                            ),
                        ));
                    }
                }
                Part::Samples(track) => {
                    for sample in track.samples() {
                        writer.write_all(&sample.payload)?;
                    }
                }
            }
        }
        writer.flush()?;
    }
    file.as_file().sync_all()?;

    file.persist(destination).map_err(|e| {
        crate::Error::new(
            ErrorKind::FinalizationFailed,
            format!("Error moving the written file to {}: {}", destination.display(), e.error),
        )
    })?;

    debug!(destination = %destination.display(), "finalized movie");
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Cursor;
    use std::sync::Arc;

    use super::*;
    use crate::atom::{head, ParseAtom};
    use crate::{Matrix, SampleDescription, TextSampleEntry, Time};

    fn text_movie(destination: &Path) -> (Movie, TrackId) {
        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let text = movie.add_track(MediaType::Text, 600, None).unwrap();
        movie.set_media_data_destination(text, destination).unwrap();
        let desc = Arc::new(SampleDescription::Text(TextSampleEntry::default()));
        for (i, title) in ["one", "two"].iter().enumerate() {
            let payload = crate::encode_text(title, false).unwrap();
            let start = Time::from_secs(i as i64 * 5);
            movie.append_sample(text, payload, &desc, start, Time::from_secs(5)).unwrap();
        }
        (movie, text)
    }

    #[test]
    fn written_chunk_offset_points_at_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mov");
        let (movie, _) = text_movie(&path);
        Mp4Finalizer.write_header(&movie, &path, &WriteConfig::DEFAULT).unwrap();

        let buf = std::fs::read(&path).unwrap();
        let mut reader = Cursor::new(&buf);
        let source = crate::Mp4Source::read_from(&mut reader).unwrap();
        assert!(source.file_type().unwrap().is_quicktime());

        let raw = source.raw_tracks().next().unwrap();
        let stbl = raw.trak.stbl().unwrap();
        let offset = stbl.chunk_offsets().unwrap().get(0).unwrap() as usize;
        assert_eq!(&buf[offset..offset + 5], b"\x00\x03one");
        assert_eq!(&buf[offset + 5..offset + 10], b"\x00\x03two");
        assert_eq!(stbl.stts.as_ref().unwrap().total_duration(), 6000);
    }

    #[test]
    fn rejects_unbound_and_gapped_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mov");
        let (movie, _) = text_movie(&dir.path().join("elsewhere.mov"));
        let err = Mp4Finalizer.write_header(&movie, &path, &WriteConfig::DEFAULT).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FinalizationFailed));
        assert!(!path.exists());

        let mut movie = Movie::new(600, Matrix::IDENTITY).unwrap();
        let text = movie.add_track(MediaType::Text, 600, None).unwrap();
        movie.set_media_data_destination(text, &path).unwrap();
        let desc = Arc::new(SampleDescription::Text(TextSampleEntry::default()));
        let payload = crate::encode_text("late", false).unwrap();
        movie.append_sample(text, payload, &desc, Time::from_secs(1), Time::from_secs(1)).unwrap();
        let err = Mp4Finalizer.write_header(&movie, &path, &WriteConfig::DEFAULT).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::FinalizationFailed));
        assert!(!path.exists());
    }

    #[test]
    fn large_offsets_use_co64() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mov");
        let (movie, text) = text_movie(&path);
        let track = movie.track(text).unwrap();

        let trak = new_trak(&movie, text, track, u32::MAX as u64 + 1, true, true).unwrap();
        let stbl = trak.stbl().unwrap();
        assert!(stbl.stco.is_none());
        assert_eq!(stbl.chunk_offsets().unwrap().get(0), Some(u32::MAX as u64 + 1));

        let buf = trak.to_bytes().unwrap();
        let mut reader = Cursor::new(&buf);
        let head = head::parse(&mut reader).unwrap();
        let parsed = Trak::parse(&mut reader, head.size()).unwrap();
        assert_eq!(parsed.tkhd, trak.tkhd);
        assert!(!parsed.tkhd.unwrap().enabled());
    }
}
