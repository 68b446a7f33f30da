use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

use murmur_fft::Complex64;

use super::{FormatError, io_error, open};
use crate::Error;

const REAL_TYPE: &str = "double";
const COMPLEX_TYPE: &str = "complex<double>";

// Header counts are untrusted; don't let them drive allocation.
const MAX_PREALLOC: usize = 4096;

#[derive(Debug)]
struct Header {
    frame_size: usize,
    num_frames: usize,
    type_tag: String,
}

fn parse_header(line: &str) -> Result<Header, FormatError> {
    let mut frame_size = None;
    let mut num_frames = None;
    let mut type_tag = String::new();

    for token in line.trim().split(',') {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "frameSize" => frame_size = Some(parse_count("frameSize", value)?),
            "numFrames" => num_frames = Some(parse_count("numFrames", value)?),
            "type" => type_tag = value.to_owned(),
            _ => {}
        }
    }

    match (frame_size, num_frames) {
        (Some(frame_size), Some(num_frames)) if frame_size > 0 && num_frames > 0 => Ok(Header {
            frame_size,
            num_frames,
            type_tag,
        }),
        _ => Err(FormatError::InvalidHeader(format!(
            "{line:?} does not declare a non-zero frameSize and numFrames"
        ))),
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize, FormatError> {
    value
        .parse()
        .map_err(|_| FormatError::InvalidHeader(format!("{key}={value} is not a count")))
}

/// Length shared by every row, or the first row that differs.
fn row_length<T>(rows: &[Vec<T>]) -> Result<usize, FormatError> {
    let expected = rows.first().map_or(0, Vec::len);
    match rows.iter().position(|row| row.len() != expected) {
        Some(frame) => Err(FormatError::InconsistentFrameLength {
            frame,
            expected,
            actual: rows[frame].len(),
        }),
        None => Ok(expected),
    }
}

fn write_rows<W: Write, T>(
    writer: &mut W,
    rows: &[Vec<T>],
    type_tag: &str,
    mut write_element: impl FnMut(&mut W, &T) -> io::Result<()>,
) -> Result<(), Error> {
    if rows.is_empty() {
        return Ok(());
    }
    let frame_size = row_length(rows)?;

    let mut write = |w: &mut W| -> io::Result<()> {
        writeln!(
            w,
            "frameSize={frame_size},numFrames={},type={type_tag}",
            rows.len()
        )?;
        for row in rows {
            for (i, element) in row.iter().enumerate() {
                if i > 0 {
                    w.write_all(b",")?;
                }
                write_element(w, element)?;
            }
            w.write_all(b"\n")?;
        }
        Ok(())
    };
    write(writer).map_err(io_error)
}

fn read_rows<R: BufRead, T>(
    reader: R,
    type_tag: &'static str,
    width: usize,
    mut build: impl FnMut(&[f64]) -> T,
) -> Result<Vec<T>, Error> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => parse_header(&line.map_err(io_error)?)?,
        None => return Err(FormatError::MissingHeader.into()),
    };
    if header.type_tag != type_tag {
        return Err(FormatError::UnsupportedType {
            expected: type_tag,
            found: header.type_tag,
        }
        .into());
    }
    let expected = header.frame_size.checked_mul(width).ok_or_else(|| {
        FormatError::InvalidHeader(format!("frameSize={} is too large", header.frame_size))
    })?;

    let mut rows = Vec::with_capacity(header.num_frames.min(MAX_PREALLOC));
    let mut values = Vec::with_capacity(expected.min(MAX_PREALLOC));
    for (index, line) in lines.enumerate() {
        let line = line.map_err(io_error)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        values.clear();
        for token in line.split(',') {
            let token = token.trim();
            let value = token.parse::<f64>().map_err(|_| FormatError::InvalidValue {
                line: index + 2,
                value: token.to_owned(),
            })?;
            values.push(value);
        }
        if values.len() != expected {
            return Err(FormatError::FrameLengthMismatch {
                frame: rows.len(),
                expected,
                actual: values.len(),
            }
            .into());
        }
        rows.push(build(&values));
    }

    if rows.len() != header.num_frames {
        return Err(FormatError::FrameCountMismatch {
            expected: header.num_frames,
            actual: rows.len(),
        }
        .into());
    }
    Ok(rows)
}

fn create(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<(), Error>,
) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)
        .and_then(|()| writer.flush().map_err(io_error))
        .map_err(|err| err.at(path))
}

/// Writes real frames with a `type=double` header. Values are written in
/// their shortest exact form, so reading them back is lossless.
pub fn write_frames_to<W: Write>(writer: &mut W, frames: &[Vec<f64>]) -> Result<(), Error> {
    write_rows(writer, frames, REAL_TYPE, |w, v| write!(w, "{v:?}"))
}

/// Writes complex frames with a `type=complex<double>` header, each element
/// as `re,im`.
pub fn write_spectra_to<W: Write>(writer: &mut W, spectra: &[Vec<Complex64>]) -> Result<(), Error> {
    write_rows(writer, spectra, COMPLEX_TYPE, |w, c| {
        write!(w, "{:?},{:?}", c.re, c.im)
    })
}

/// Reads frames written by [`write_frames_to`].
pub fn read_frames_from<R: BufRead>(reader: R) -> Result<Vec<Vec<f64>>, Error> {
    read_rows(reader, REAL_TYPE, 1, <[f64]>::to_vec)
}

/// Reads spectra written by [`write_spectra_to`].
pub fn read_spectra_from<R: BufRead>(reader: R) -> Result<Vec<Vec<Complex64>>, Error> {
    read_rows(reader, COMPLEX_TYPE, 2, |values| {
        values
            .chunks_exact(2)
            .map(|pair| Complex64::new(pair[0], pair[1]))
            .collect()
    })
}

/// Writes `frames` to `path`. An empty set creates no file.
pub fn write_frames(path: impl AsRef<Path>, frames: &[Vec<f64>]) -> Result<(), Error> {
    if frames.is_empty() {
        return Ok(());
    }
    row_length(frames)?;
    create(path.as_ref(), |w| write_frames_to(w, frames))
}

/// Writes `spectra` to `path`. An empty set creates no file.
pub fn write_spectra(path: impl AsRef<Path>, spectra: &[Vec<Complex64>]) -> Result<(), Error> {
    if spectra.is_empty() {
        return Ok(());
    }
    row_length(spectra)?;
    create(path.as_ref(), |w| write_spectra_to(w, spectra))
}

/// Reads a real frame file.
pub fn read_frames(path: impl AsRef<Path>) -> Result<Vec<Vec<f64>>, Error> {
    let path = path.as_ref();
    read_frames_from(open(path)?).map_err(|err| err.at(path))
}

/// Reads a complex frame file.
pub fn read_spectra(path: impl AsRef<Path>) -> Result<Vec<Vec<Complex64>>, Error> {
    let path = path.as_ref();
    read_spectra_from(open(path)?).map_err(|err| err.at(path))
}

/// Writes a signal as one line of space-separated values, without header.
pub fn write_signal_to<W: Write>(writer: &mut W, signal: &[f64]) -> Result<(), Error> {
    if signal.is_empty() {
        return Ok(());
    }
    let write = |w: &mut W| -> io::Result<()> {
        for (i, v) in signal.iter().enumerate() {
            if i > 0 {
                w.write_all(b" ")?;
            }
            write!(w, "{v:?}")?;
        }
        w.write_all(b"\n")
    };
    write(writer).map_err(io_error)
}

/// Reads whitespace-separated values written by [`write_signal_to`].
pub fn read_signal_from<R: BufRead>(reader: R) -> Result<Vec<f64>, Error> {
    let mut signal = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| FormatError::InvalidValue {
                line: index + 1,
                value: token.to_owned(),
            })?;
            signal.push(value);
        }
    }
    Ok(signal)
}

/// Writes `signal` to `path`. An empty signal creates no file.
pub fn write_signal(path: impl AsRef<Path>, signal: &[f64]) -> Result<(), Error> {
    if signal.is_empty() {
        return Ok(());
    }
    create(path.as_ref(), |w| write_signal_to(w, signal))
}

/// Reads a signal file.
pub fn read_signal(path: impl AsRef<Path>) -> Result<Vec<f64>, Error> {
    let path = path.as_ref();
    read_signal_from(open(path)?).map_err(|err| err.at(path))
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use test_strategy::proptest;

    use super::*;

    fn format_err(err: Error) -> FormatError {
        match err {
            Error::Format(err) => err,
            other => panic!("expected a format error, got {other}"),
        }
    }

    fn frames_text(frames: &[Vec<f64>]) -> String {
        let mut buf = Vec::new();
        write_frames_to(&mut buf, frames).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_header_and_rows() {
        let text = frames_text(&[vec![1.0, -2.5], vec![0.125, 3.0]]);
        assert_eq!(
            text,
            "frameSize=2,numFrames=2,type=double\n1.0,-2.5\n0.125,3.0\n"
        );
    }

    #[test]
    fn writes_complex_pairs() {
        let mut buf = Vec::new();
        let spectra = vec![vec![Complex64::new(1.0, -0.5), Complex64::new(0.0, 2.0)]];
        write_spectra_to(&mut buf, &spectra).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "frameSize=2,numFrames=1,type=complex<double>\n1.0,-0.5,0.0,2.0\n"
        );
        let text = "frameSize=2,numFrames=1,type=complex<double>\n1.0,-0.5,0.0,2.0\n";
        assert_eq!(read_spectra_from(text.as_bytes()).unwrap(), spectra);
    }

    #[test]
    fn header_keys_in_any_order_and_blank_lines() {
        let text = "type=double,numFrames=2,extra=1,frameSize=3\n\n1,2,3\n  \n4,5,6\n\n";
        let frames = read_frames_from(text.as_bytes()).unwrap();
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn rejects_bad_headers() {
        assert_eq!(
            format_err(read_frames_from("".as_bytes()).unwrap_err()),
            FormatError::MissingHeader
        );
        for header in [
            "frameSize=0,numFrames=1,type=double\n",
            "frameSize=4,type=double\n",
            "frameSize=x,numFrames=1,type=double\n",
        ] {
            let err = format_err(read_frames_from(header.as_bytes()).unwrap_err());
            assert!(matches!(err, FormatError::InvalidHeader(_)), "{err}");
        }
        let err = format_err(
            read_frames_from("frameSize=1,numFrames=1,type=complex<double>\n0,0\n".as_bytes())
                .unwrap_err(),
        );
        assert_eq!(
            err,
            FormatError::UnsupportedType {
                expected: "double",
                found: "complex<double>".into()
            }
        );
    }

    #[test]
    fn rejects_bad_rows() {
        let err = format_err(
            read_frames_from("frameSize=3,numFrames=2,type=double\n1,2,3\n1,2\n".as_bytes())
                .unwrap_err(),
        );
        assert_eq!(
            err,
            FormatError::FrameLengthMismatch {
                frame: 1,
                expected: 3,
                actual: 2
            }
        );

        let err = format_err(
            read_frames_from("frameSize=2,numFrames=3,type=double\n1,2\n3,4\n".as_bytes())
                .unwrap_err(),
        );
        assert_eq!(
            err,
            FormatError::FrameCountMismatch {
                expected: 3,
                actual: 2
            }
        );

        let err = format_err(
            read_frames_from("frameSize=2,numFrames=1,type=double\n\n1,abc\n".as_bytes())
                .unwrap_err(),
        );
        assert_eq!(
            err,
            FormatError::InvalidValue {
                line: 3,
                value: "abc".into()
            }
        );

        // Odd number of values for a complex row.
        let err = format_err(
            read_spectra_from("frameSize=2,numFrames=1,type=complex<double>\n1,2,3\n".as_bytes())
                .unwrap_err(),
        );
        assert!(matches!(err, FormatError::FrameLengthMismatch { expected: 4, .. }));
    }

    #[test]
    fn rejects_ragged_frames_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.txt");
        let err = format_err(write_frames(&path, &[vec![1.0; 3], vec![1.0; 2]]).unwrap_err());
        assert_eq!(
            err,
            FormatError::InconsistentFrameLength {
                frame: 1,
                expected: 3,
                actual: 2
            }
        );
        assert!(!path.exists());
    }

    #[test]
    fn empty_sets_create_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames.txt");
        let signal = dir.path().join("signal.txt");
        write_frames(&frames, &[]).unwrap();
        write_signal(&signal, &[]).unwrap();
        assert!(!frames.exists());
        assert!(!signal.exists());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        match read_frames(&path).unwrap_err() {
            Error::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn signal_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signal.txt");
        let signal = vec![0.5, -1e-12, 3.0, 0.0];
        write_signal(&path, &signal).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "0.5 -1e-12 3.0 0.0\n"
        );
        assert_eq!(read_signal(&path).unwrap(), signal);
    }

    #[proptest]
    fn frames_survive_a_file_round_trip(
        #[strategy(1usize..16)] frame_size: usize,
        #[strategy(vec(vec(-1e9f64..1e9, #frame_size), 1..8))] frames: Vec<Vec<f64>>,
    ) {
        proptest::prop_assert!(frames.iter().all(|f| f.len() == frame_size));
        let text = frames_text(&frames);
        let back = read_frames_from(text.as_bytes()).unwrap();
        proptest::prop_assert_eq!(back, frames);
    }
}
