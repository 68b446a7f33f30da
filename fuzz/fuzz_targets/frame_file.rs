#![no_main]

use libfuzzer_sys::fuzz_target;
use murmur::io;

fuzz_target!(|data: &[u8]| {
    // Parsing arbitrary text must fail cleanly, and anything accepted must
    // survive a write/read round trip.
    if let Ok(frames) = io::read_frames_from(data) {
        let mut buf = Vec::new();
        io::write_frames_to(&mut buf, &frames).expect("in-memory write");
        let back = io::read_frames_from(buf.as_slice()).expect("re-read");
        assert_eq!(back.len(), frames.len());
        for (a, b) in back.iter().flatten().zip(frames.iter().flatten()) {
            assert!(a == b || (a.is_nan() && b.is_nan()));
        }
    }
    let _ = io::read_spectra_from(data);
    let _ = io::read_binary_samples_from(data);
    let _ = io::read_hex_samples_from(data);
});
