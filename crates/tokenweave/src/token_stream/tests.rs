use alloc::{string::String, vec, vec::Vec};

use quickcheck::QuickCheck;
use rstest::rstest;

use super::*;
use crate::{
    error::ErrorKind,
    options::StreamOptions,
    token::{CommonToken, DEFAULT_CHANNEL, EOF, HIDDEN_CHANNEL, ListTokenSource, WritableToken},
};

const ID: i32 = 1;
const INT: i32 = 2;
const WS: i32 = 3;
const OP: i32 = 4;

fn list_source(items: &[(i32, i32, &str)]) -> ListTokenSource {
    let mut offset = 0;
    let tokens: Vec<CommonToken> = items
        .iter()
        .map(|&(token_type, channel, text)| {
            let len = isize::try_from(text.chars().count()).unwrap();
            let mut t = CommonToken::with_text(token_type, text);
            t.set_channel(channel);
            t.set_start_index(offset);
            t.set_stop_index(offset + len - 1);
            offset += len;
            t
        })
        .collect();
    ListTokenSource::with_source_name(tokens, "test")
}

/// `x = 3;` with hidden whitespace.
fn assignment() -> ListTokenSource {
    list_source(&[
        (ID, DEFAULT_CHANNEL, "x"),
        (WS, HIDDEN_CHANNEL, " "),
        (OP, DEFAULT_CHANNEL, "="),
        (WS, HIDDEN_CHANNEL, " "),
        (INT, DEFAULT_CHANNEL, "3"),
        (OP, DEFAULT_CHANNEL, ";"),
    ])
}

/// ` x =34  ; \n` followed by an explicit EOF token.
fn off_channel_input() -> ListTokenSource {
    let mut items = vec![
        (ID, HIDDEN_CHANNEL, " "),
        (ID, DEFAULT_CHANNEL, "x"),
        (ID, HIDDEN_CHANNEL, " "),
        (ID, DEFAULT_CHANNEL, "="),
        (ID, DEFAULT_CHANNEL, "34"),
        (ID, HIDDEN_CHANNEL, " "),
        (ID, HIDDEN_CHANNEL, " "),
        (ID, DEFAULT_CHANNEL, ";"),
        (ID, HIDDEN_CHANNEL, " "),
        (ID, HIDDEN_CHANNEL, "\n"),
    ];
    items.push((EOF, DEFAULT_CHANNEL, ""));
    list_source(&items)
}

fn indices(tokens: &[&CommonToken]) -> Vec<isize> {
    tokens.iter().map(|t| t.token_index()).collect()
}

fn lt_text<S: TokenStream>(stream: &mut S, k: isize) -> String {
    stream
        .lt(k)
        .unwrap()
        .and_then(|t| t.text())
        .map(|t| t.into_owned())
        .unwrap_or_default()
}

#[test]
fn lazy_until_first_access() {
    let mut s = BufferedTokenStream::new(assignment());
    assert_eq!(s.size().unwrap(), 0);
    assert_eq!(s.la(1).unwrap(), ID);
    assert_eq!(s.size().unwrap(), 1);
    assert_eq!(s.la(3).unwrap(), OP);
    assert_eq!(s.size().unwrap(), 3);
    assert_eq!(s.get(2).unwrap().token_index(), 2);
    assert_eq!(s.get(3).unwrap_err().kind(), ErrorKind::Misuse);
}

#[test]
fn unfiltered_stream_sees_every_channel() {
    let mut s = BufferedTokenStream::new(assignment());
    assert_eq!(lt_text(&mut s, 1), "x");
    s.consume().unwrap();
    assert_eq!(lt_text(&mut s, 1), " ");
    assert_eq!(lt_text(&mut s, -1), "x");
    assert!(s.lt(-2).unwrap().is_none());
    assert!(s.lt(0).unwrap().is_none());
    assert_eq!(s.la(0).unwrap(), 0);
    assert_eq!(s.la(100).unwrap(), EOF);
    assert_eq!(s.source_name(), "test");
}

#[test]
fn fill_terminates_with_eof() {
    let options = StreamOptions {
        fetch_block_size: 2,
        ..StreamOptions::default()
    };
    let mut s = BufferedTokenStream::with_options(assignment(), None, options);
    s.fill().unwrap();
    assert_eq!(s.size().unwrap(), 7);
    assert_eq!(s.tokens().last().unwrap().token_type(), EOF);
    assert!(s.tokens()[..6].iter().all(|t| t.token_type() != EOF));
    let expected: Vec<isize> = (0..7).collect();
    let actual: Vec<isize> = s.tokens().iter().map(Token::token_index).collect();
    assert_eq!(actual, expected);
}

fn quickcheck_tests() -> u64 {
    if cfg!(feature = "test-fast") || is_ci::cached() {
        64
    } else {
        512
    }
}

#[test]
fn fill_ends_with_exactly_one_eof_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(kinds: Vec<u8>, explicit_eof: bool, block: u8) -> bool {
        let mut items: Vec<(i32, i32, &str)> = kinds
            .iter()
            .map(|&k| (i32::from(k % 4) + 1, i32::from(k % 2), "t"))
            .collect();
        if explicit_eof {
            items.push((EOF, DEFAULT_CHANNEL, ""));
        }
        let options = StreamOptions {
            fetch_block_size: usize::from(block % 8) + 1,
            ..StreamOptions::default()
        };
        let mut s = BufferedTokenStream::with_options(list_source(&items), None, options);
        if s.fill().is_err() {
            return false;
        }
        let tokens = s.tokens();
        let Some((last, rest)) = tokens.split_last() else {
            return false;
        };
        tokens.len() == kinds.len() + 1
            && last.token_type() == EOF
            && rest.iter().all(|t| t.token_type() != EOF)
            && tokens
                .iter()
                .enumerate()
                .all(|(i, t)| t.token_index() == isize::try_from(i).unwrap())
    }
    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Vec<u8>, bool, u8) -> bool);
}

#[test]
fn text_of_whole_input_and_ranges() {
    let mut s = BufferedTokenStream::new(assignment());
    assert_eq!(s.text().unwrap(), "x = 3;");
    assert_eq!(s.text_in(Interval::of(2, 4)).unwrap(), "= 3");
    assert_eq!(s.text_in(Interval::of(4, 100)).unwrap(), "3;");
    assert_eq!(s.text_in(Interval::of(-1, 3)).unwrap(), "");
}

#[test]
fn ranges_and_type_filters() {
    let mut s = BufferedTokenStream::new(assignment());
    let range: Vec<isize> = s.get_range(1, 100).unwrap().iter().map(Token::token_index).collect();
    assert_eq!(range, vec![1, 2, 3, 4, 5]);
    assert!(s.get_range(4, 2).unwrap().is_empty());

    assert_eq!(indices(&s.tokens_in(0, 5, Some(&[OP])).unwrap()), vec![2, 5]);
    assert_eq!(indices(&s.tokens_in(0, 6, None).unwrap()).len(), 7);
    assert!(s.tokens_in(0, 5, Some(&[99])).unwrap().is_empty());
    assert!(s.tokens_in(3, 2, None).unwrap().is_empty());
    let err = s.tokens_in(0, 7, None).unwrap_err();
    assert!(matches!(err, StreamError::IndexOutOfBounds { index: 7, .. }));
}

#[test]
fn channel_filter_skips_off_channel_tokens() {
    let mut s = BufferedTokenStream::on_default_channel(off_channel_input());
    assert_eq!(lt_text(&mut s, 1), "x");
    s.consume().unwrap();
    assert_eq!(lt_text(&mut s, 1), "=");
    assert_eq!(lt_text(&mut s, -1), "x");
    s.consume().unwrap();
    assert_eq!(lt_text(&mut s, 1), "34");
    assert_eq!(lt_text(&mut s, -1), "=");
    s.consume().unwrap();
    assert_eq!(lt_text(&mut s, 1), ";");
    assert_eq!(lt_text(&mut s, -1), "34");
    s.consume().unwrap();
    assert_eq!(s.la(1).unwrap(), EOF);
    assert_eq!(lt_text(&mut s, -1), ";");
    assert_eq!(lt_text(&mut s, -2), "34");
    assert_eq!(lt_text(&mut s, -3), "=");
    assert_eq!(lt_text(&mut s, -4), "x");
    assert!(s.lt(-5).unwrap().is_none());
}

#[test]
fn channel_filter_lookahead_and_seek() {
    let mut s = BufferedTokenStream::on_default_channel(off_channel_input());
    assert_eq!(lt_text(&mut s, 2), "=");
    assert_eq!(lt_text(&mut s, 4), ";");
    assert_eq!(s.la(5).unwrap(), EOF);
    assert_eq!(s.la(9).unwrap(), EOF);
    s.seek(5).unwrap();
    assert_eq!(s.index(), 7);
    s.reset().unwrap();
    assert_eq!(s.index(), 1);
    assert_eq!(s.number_of_on_channel_tokens().unwrap(), 5);
}

#[test]
fn hidden_channel_view() {
    let mut s = BufferedTokenStream::on_channel(assignment(), HIDDEN_CHANNEL);
    assert_eq!(s.channel(), Some(HIDDEN_CHANNEL));
    assert_eq!(s.index(), 0);
    assert_eq!(s.la(1).unwrap(), WS);
    assert_eq!(s.index(), 1);
    assert_eq!(s.number_of_on_channel_tokens().unwrap(), 2);
}

#[test]
fn hidden_tokens_around_each_index() {
    let mut s = BufferedTokenStream::on_default_channel(off_channel_input());
    s.fill().unwrap();
    let cases: [(usize, &[isize], &[isize]); 10] = [
        (0, &[], &[]),
        (1, &[0], &[2]),
        (2, &[], &[]),
        (3, &[2], &[]),
        (4, &[], &[5, 6]),
        (5, &[], &[6]),
        (6, &[5], &[]),
        (7, &[5, 6], &[8, 9]),
        (8, &[], &[9]),
        (9, &[8], &[]),
    ];
    for (index, left, right) in cases {
        assert_eq!(indices(&s.hidden_tokens_to_left(index, None).unwrap()), left, "left of {index}");
        assert_eq!(indices(&s.hidden_tokens_to_right(index, None).unwrap()), right, "right of {index}");
    }
    assert!(s.hidden_tokens_to_right(7, Some(5)).unwrap().is_empty());
    assert_eq!(indices(&s.hidden_tokens_to_right(7, Some(HIDDEN_CHANNEL)).unwrap()), vec![8, 9]);
    assert!(s.hidden_tokens_to_left(11, None).is_err());
}

#[test]
fn channel_navigation() {
    let mut s = BufferedTokenStream::new(off_channel_input());
    assert_eq!(s.next_token_on_channel(0, DEFAULT_CHANNEL).unwrap(), 1);
    assert_eq!(s.next_token_on_channel(8, DEFAULT_CHANNEL).unwrap(), 10);
    assert_eq!(s.next_token_on_channel(50, DEFAULT_CHANNEL).unwrap(), 10);
    assert_eq!(s.next_token_on_channel(5, 7).unwrap(), 10);
    assert_eq!(s.previous_token_on_channel(6, DEFAULT_CHANNEL).unwrap(), Some(4));
    assert_eq!(s.previous_token_on_channel(0, DEFAULT_CHANNEL).unwrap(), None);
    assert_eq!(s.previous_token_on_channel(50, 7).unwrap(), Some(10));
}

#[test]
fn single_eof() {
    let mut s = BufferedTokenStream::on_default_channel(list_source(&[]));
    s.fill().unwrap();
    assert_eq!(s.la(1).unwrap(), EOF);
    assert_eq!(s.index(), 0);
    assert_eq!(s.size().unwrap(), 1);
    assert!(matches!(s.consume(), Err(StreamError::ConsumeEof)));
}

#[test]
fn consume_stops_at_eof() {
    let mut s = BufferedTokenStream::new(assignment());
    for _ in 0..6 {
        s.consume().unwrap();
    }
    assert_eq!(s.la(1).unwrap(), EOF);
    assert_eq!(s.consume().unwrap_err().kind(), ErrorKind::Misuse);
    assert!(matches!(s.seek(-1), Err(StreamError::NegativeSeek(-1))));
}

#[test]
fn swapping_the_source_resets() {
    let mut s = BufferedTokenStream::new(assignment());
    s.fill().unwrap();
    let old = s.set_token_source(list_source(&[(ID, DEFAULT_CHANNEL, "y")]));
    assert_eq!(old.source_name(), "test");
    assert_eq!(s.size().unwrap(), 0);
    assert_eq!(lt_text(&mut s, 1), "y");
    assert_eq!(s.text().unwrap(), "y");
}

fn letters() -> ListTokenSource {
    list_source(&[(ID, DEFAULT_CHANNEL, "a"), (ID, DEFAULT_CHANNEL, "b"), (ID, DEFAULT_CHANNEL, "c")])
}

#[test]
fn unbuffered_drops_window_without_marks() {
    let mut s = UnbufferedTokenStream::new(letters()).unwrap();
    assert!(s.lt(-1).unwrap().is_none());
    assert_eq!(lt_text(&mut s, 1), "a");
    s.consume().unwrap();
    assert_eq!(s.buffer_start_index(), 1);
    assert_eq!(lt_text(&mut s, -1), "a");
    assert_eq!(s.get(1).unwrap().token_index(), 1);
    assert!(matches!(s.get(0), Err(StreamError::IndexOutOfBounds { index: 0, .. })));
    assert!(matches!(s.lt(-2), Err(StreamError::IndexOutOfBounds { .. })));
    assert_eq!(s.la(3).unwrap(), EOF);
    assert_eq!(s.la(9).unwrap(), EOF);
    assert_eq!(s.size().unwrap_err().kind(), ErrorKind::Unsupported);
}

#[test]
fn unbuffered_mark_retains_text() {
    let mut s = UnbufferedTokenStream::new(letters()).unwrap();
    let marker = s.mark();
    for _ in 0..3 {
        s.consume().unwrap();
    }
    assert_eq!(s.text_in(Interval::of(0, 2)).unwrap(), "abc");
    assert_eq!(s.text_in(Interval::of(0, 3)).unwrap(), "abc");
    assert_eq!(lt_text(&mut s, -2), "b");

    s.seek(1).unwrap();
    assert_eq!(lt_text(&mut s, 1), "b");
    assert_eq!(lt_text(&mut s, -1), "a");
    s.seek(0).unwrap();
    assert!(s.lt(-1).unwrap().is_none());
    s.seek(3).unwrap();

    s.release(marker).unwrap();
    assert_eq!(s.buffer_start_index(), 3);
    let err = s.text_in(Interval::of(0, 2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unsupported);
    assert!(matches!(s.seek(0), Err(StreamError::SeekOutsideBuffer { .. })));
    assert_eq!(lt_text(&mut s, -1), "c");
    assert!(matches!(s.consume(), Err(StreamError::ConsumeEof)));
}

#[rstest]
#[case(1)]
#[case(2)]
fn unbuffered_nested_marks(#[case] buffer_size: usize) {
    let options = StreamOptions {
        buffer_size,
        ..StreamOptions::default()
    };
    let mut s = UnbufferedTokenStream::with_options(letters(), options).unwrap();
    let outer = s.mark();
    s.consume().unwrap();
    let inner = s.mark();
    s.consume().unwrap();
    assert!(matches!(s.release(outer), Err(StreamError::InvalidMarker { .. })));
    s.release(inner).unwrap();
    assert_eq!(s.text_in(Interval::of(0, 1)).unwrap(), "ab");
    s.release(outer).unwrap();
    assert!(s.release(outer).is_err());
    assert_eq!(s.buffer_start_index(), 2);
    assert_eq!(s.index(), 2);
    assert_eq!(lt_text(&mut s, 1), "c");
}

#[test]
fn unbuffered_seek_clamps_to_eof() {
    let mut s = UnbufferedTokenStream::new(letters()).unwrap();
    let marker = s.mark();
    s.seek(10).unwrap();
    assert_eq!(s.index(), 3);
    assert_eq!(s.la(1).unwrap(), EOF);
    assert!(matches!(s.seek(-2), Err(StreamError::NegativeSeek(-2))));
    s.release(marker).unwrap();
}
