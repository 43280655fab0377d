#![no_main]
use libfuzzer_sys::fuzz_target;
use lz4stream::{FrameInputStream, FrameOptions, GreedyStream, MemoryStream};

fuzz_target!(|data: &[u8]| {
    let options = FrameOptions::default().with_buffer_size(512);
    if let Ok(mut reader) = FrameInputStream::new(data, options) {
        let mut sink = MemoryStream::new();
        let _ = reader.read_all(&mut sink);
    }
});
