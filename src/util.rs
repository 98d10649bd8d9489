use std::fs::File;
use std::io;

pub fn looks_like_gzip(prefix: &[u8]) -> bool {
    prefix.len() >= 2 && prefix[..2] == [0x1F, 0x8B]
}

pub fn open_file(path: &std::path::Path) -> io::Result<File> {
    File::open(path)
}
