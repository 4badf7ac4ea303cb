#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tokenweave::{CharStream, IntStream, Interval, StreamOptions, UnbufferedCharStream, char_stream};

#[derive(Debug, Arbitrary)]
enum Step {
    Consume,
    La(i8),
    Mark,
    Release,
    Seek(u8),
    Text(u8, u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    buffer_size: u8,
    steps: Vec<Step>,
}

// Drives an unbuffered stream and a fully buffered one in lockstep; the
// unbuffered stream may refuse an operation but never disagree.
fuzz_target!(|input: Input| {
    let options = StreamOptions {
        buffer_size: usize::from(input.buffer_size),
        ..StreamOptions::default()
    };
    let Ok(mut unbuffered) = UnbufferedCharStream::from_text_with_options(&input.text, options) else {
        return;
    };
    let mut buffered = char_stream::from_str(&input.text);
    let mut markers = Vec::new();

    for step in input.steps {
        match step {
            Step::Consume => {
                let a = unbuffered.consume().is_ok();
                let b = buffered.consume().is_ok();
                assert_eq!(a, b);
            }
            Step::La(i) => {
                let i = isize::from(i);
                if let Ok(u) = unbuffered.la(i) {
                    if i >= 0 || unbuffered.index() >= i.unsigned_abs() {
                        assert_eq!(Ok(u), buffered.la(i).map_err(|_| ()));
                    }
                }
            }
            Step::Mark => markers.push(unbuffered.mark()),
            Step::Release => {
                if let Some(m) = markers.pop() {
                    unbuffered.release(m).unwrap();
                }
            }
            Step::Seek(i) => {
                let i = isize::from(i);
                if unbuffered.seek(i).is_ok() {
                    buffered.seek(i).unwrap();
                }
                assert_eq!(unbuffered.index(), buffered.index());
            }
            Step::Text(a, b) => {
                let interval = Interval::of(isize::from(a), isize::from(b));
                if let Ok(t) = unbuffered.text(interval) {
                    assert_eq!(Ok(t), buffered.text(interval).map_err(|_| ()));
                }
            }
        }
    }
});
