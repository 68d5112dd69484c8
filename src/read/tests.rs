#![cfg(test)]

use std::io::{self, BufReader, ErrorKind, Read};
use std::thread;

use super::*;
use crate::alloc::AllocPolicy;
use crate::util::alloc::{LimitedAlloc, init_logging};

/// A reader which fails with `kind` once `good` bytes have been read.
struct Failing<'a> {
    good: &'a [u8],
    kind: ErrorKind,
}

impl Read for Failing<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.good.is_empty() {
            return Err(self.kind.into());
        }
        self.good.read(buf)
    }
}

/// A reader which hands out a single byte per call, interrupted before every other one.
struct Trickle<'a> {
    data: &'a [u8],
    interrupt: bool,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt = !self.interrupt;
        if self.interrupt {
            return Err(ErrorKind::Interrupted.into());
        }
        let count = self.data.len().min(buf.len()).min(1);
        buf[..count].copy_from_slice(&self.data[..count]);
        self.data = &self.data[count..];
        Ok(count)
    }
}

#[test]
fn test_read_lines() {
    let policy = AllocPolicy::reporting();
    let mut source: &[u8] = b"abc\ndef\n";

    let first = read_line(&mut source, policy).expect("read should succeed");
    assert_eq!(first.as_ref().map(|l| l.as_bytes_with_nul()), Some(Some(&b"abc\0"[..])));
    assert_eq!(read_line(&mut source, policy).expect("read should succeed").unwrap(), "def");
    assert!(
        read_line(&mut source, policy).expect("read should succeed").is_none(),
        "The end of the input should produce no line."
    );
}

#[test]
fn test_read_line_empty_input() {
    let mut source: &[u8] = b"";
    assert!(read_line(&mut source, AllocPolicy::reporting()).expect("read should succeed").is_none());
}

#[test]
fn test_empty_line_is_not_end() {
    let policy = AllocPolicy::reporting();
    let mut source: &[u8] = b"\n";

    let line = read_line(&mut source, policy)
        .expect("read should succeed")
        .expect("an empty line should still be a line");
    assert!(line.is_empty());
    assert_eq!(line.cap(), 1, "An empty line should only hold its terminator.");
    assert!(read_line(&mut source, policy).expect("read should succeed").is_none());
}

#[test]
fn test_read_line_without_newline() {
    let policy = AllocPolicy::reporting();
    let long = [b'z'; 100];
    let mut source: &[u8] = &long;

    let line = read_line(&mut source, policy).expect("read should succeed").unwrap();
    assert_eq!(line, &long);
    assert_eq!(line.cap(), 101);
    assert!(read_line(&mut source, policy).expect("read should succeed").is_none());
}

#[test]
fn test_read_line_retries_interrupts() {
    let mut source = BufReader::with_capacity(4, Trickle { data: b"ab\ncd", interrupt: false });
    let lines: Result<Vec<_>, _> = lines(&mut source, AllocPolicy::reporting()).collect();
    let lines = lines.expect("interrupted reads should be retried");

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "ab");
    assert_eq!(lines[1], "cd");
}

#[test]
fn test_read_line_error() {
    init_logging();
    let mut source = BufReader::new(Failing { good: b"ab", kind: ErrorKind::BrokenPipe });

    let res = read_line(&mut source, AllocPolicy::reporting());
    assert_eq!(res, Err(ReadError::IO(IOError)));
}

#[test]
fn test_read_line_exhausted() {
    let alloc = LimitedAlloc::leak(1);
    let line = [b'x'; 40];
    let mut source: &[u8] = &line;

    let res = read_line(&mut source, alloc.reporting());
    assert!(matches!(res, Err(ReadError::OOM(_))), "Growing past the first buffer should fail.");
    assert_eq!(alloc.live(), 0, "The partial line should have been released.");
}

#[test]
fn test_lines_iterator() {
    let mut source: &[u8] = b"one\n\nthree";
    let lines: Vec<_> = lines(&mut source, AllocPolicy::reporting())
        .map(|l| l.expect("read should succeed").to_string())
        .collect();

    assert_eq!(lines, ["one", "", "three"]);
}

#[test]
fn test_shared_source() {
    let input: String = (0..200).map(|i| format!("line number {i:03} {}\n", "-".repeat(i % 50))).collect();
    let shared = SharedSource::new(input.as_bytes());
    let policy = AllocPolicy::reporting();

    let mut read: Vec<String> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut mine = Vec::new();
                    while let Some(line) = shared.read_line(policy).expect("read should succeed") {
                        mine.push(line.to_string());
                    }
                    mine
                })
            })
            .collect();

        handles.into_iter().flat_map(|h| h.join().expect("reader shouldn't panic")).collect()
    });

    read.sort();
    let expected: Vec<String> = input.lines().map(str::to_owned).collect();
    assert_eq!(read, expected, "Each line should be read whole, exactly once.");
    assert!(shared.into_inner().is_empty());
}

#[test]
fn test_read_all() {
    let data: Vec<u8> = (0..=255).cycle().take(1000).collect();

    let bytes = read_all(&mut &data[..], AllocPolicy::reporting()).expect("read should succeed");
    assert_eq!(bytes, &data[..]);
    assert_eq!(bytes.cap(), 1000, "The result should fit the data exactly.");
    assert!(!bytes.is_terminated());

    let mut trickle = Trickle { data: b"slow", interrupt: false };
    let bytes = read_all(&mut trickle, AllocPolicy::reporting()).expect("interrupts should be retried");
    assert_eq!(bytes, "slow");
}

#[test]
fn test_read_all_empty() {
    let bytes = read_all(&mut io::empty(), AllocPolicy::reporting()).expect("read should succeed");
    assert!(bytes.is_empty());
    assert_eq!(bytes.cap(), 0);
}

#[test]
fn test_read_all_failure() {
    let alloc = LimitedAlloc::leak(4);
    let mut reader = Failing { good: &[7; 100], kind: ErrorKind::WouldBlock };

    assert_eq!(read_all(&mut reader, alloc.reporting()), Err(ReadError::WouldBlock(WouldBlockError)));
    assert_eq!(alloc.live(), 0, "A failed read should release the buffer.");
}

#[test]
fn test_read_text() {
    let policy = AllocPolicy::reporting();

    let text = read_text(&mut &b"hello world\n\r\n"[..], policy)
        .expect("read should succeed")
        .expect("text should be present");
    assert_eq!(text, "hello world");
    assert_eq!(text.cap(), 12, "Trailing bytes should be trimmed before shrinking.");
    assert!(text.is_terminated());

    assert!(read_text(&mut &[EOT, b'a'][..], policy).expect("read should succeed").is_none());

    let blank = read_text(&mut &b"\n\n"[..], policy).expect("read should succeed").unwrap();
    assert!(blank.is_empty());
    assert_eq!(read_text(&mut &b"a\tb"[..], policy).expect("read should succeed").unwrap(), "a\tb");
}
