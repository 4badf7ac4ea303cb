#![allow(missing_docs)]

use common::{ID, INT, OP, ToyLexer, WS};
use insta::assert_snapshot;
use tokenweave::{
    BufferedTokenStream, EOF, IntStream, Interval, Token, TokenSource, TokenStream, char_stream,
    token::HIDDEN_CHANNEL,
};

mod common;

fn types<S: TokenStream>(stream: &mut S) -> Vec<i32> {
    let mut out = Vec::new();
    loop {
        let t = stream.la(1).unwrap();
        out.push(t);
        if t == EOF {
            return out;
        }
        stream.consume().unwrap();
    }
}

#[test]
fn lexer_tokens_print_with_positions() {
    let lexer = ToyLexer::new(char_stream::from_str_named("x = 3;\ny", "assign"));
    let mut stream = BufferedTokenStream::new(lexer);
    stream.fill().unwrap();
    let lines: Vec<String> = stream.tokens().iter().map(ToString::to_string).collect();
    assert_snapshot!(lines.join("\n"), @r"
    [@0,0:0='x',<1>,1:0]
    [@1,1:1=' ',<3>,channel=1,1:1]
    [@2,2:2='=',<4>,1:2]
    [@3,3:3=' ',<3>,channel=1,1:3]
    [@4,4:4='3',<2>,1:4]
    [@5,5:5=';',<4>,1:5]
    [@6,6:6='\n',<3>,channel=1,1:6]
    [@7,7:7='y',<1>,2:0]
    [@8,8:7='<EOF>',<-1>,2:1]
    ");
    assert_eq!(stream.token_source().source_name(), "assign");
}

#[test]
fn default_channel_view_skips_whitespace() {
    let lexer = ToyLexer::new(char_stream::from_str("x = 3 * 0;"));
    let mut stream = BufferedTokenStream::on_default_channel(lexer);
    assert_eq!(types(&mut stream), [ID, OP, INT, OP, INT, OP, EOF]);
    // Text covers hidden tokens too.
    assert_eq!(stream.text().unwrap(), "x = 3 * 0;");
    assert_eq!(stream.size().unwrap(), 11);
    assert_eq!(stream.number_of_on_channel_tokens().unwrap(), 7);
}

#[test]
fn unfiltered_view_sees_whitespace() {
    let lexer = ToyLexer::new(char_stream::from_str("a  b"));
    let mut stream = BufferedTokenStream::new(lexer);
    assert_eq!(types(&mut stream), [ID, WS, ID, EOF]);
}

#[test]
fn lookahead_and_lookbehind_on_channel() {
    let lexer = ToyLexer::new(char_stream::from_str("x = 3 * 0;"));
    let mut stream = BufferedTokenStream::on_default_channel(lexer);
    let text = |t: Option<&tokenweave::CommonToken>| t.and_then(|t| t.text()).unwrap().into_owned();

    assert_eq!(text(stream.lt(1).unwrap()), "x");
    assert_eq!(text(stream.lt(3).unwrap()), "3");
    stream.consume().unwrap();
    stream.consume().unwrap();
    // On `3`, two default-channel tokens back is `x`.
    assert_eq!(stream.index(), 4);
    assert_eq!(text(stream.lt(-1).unwrap()), "=");
    assert_eq!(text(stream.lt(-2).unwrap()), "x");
    assert!(stream.lt(-3).unwrap().is_none());
    assert_eq!(stream.la(2).unwrap(), OP);
}

#[test]
fn hidden_tokens_between_default_tokens() {
    let lexer = ToyLexer::new(char_stream::from_str("a \n b"));
    let mut stream = BufferedTokenStream::on_default_channel(lexer);
    stream.fill().unwrap();
    let right: Vec<_> = stream
        .hidden_tokens_to_right(0, Some(HIDDEN_CHANNEL))
        .unwrap()
        .into_iter()
        .map(|t| t.text().unwrap().into_owned())
        .collect();
    assert_eq!(right, [" \n "]);
    let left = stream.hidden_tokens_to_left(2, None).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].line(), 1);
    assert!(stream.hidden_tokens_to_left(0, None).unwrap().is_empty());
}

#[test]
fn text_by_interval_and_token_range() {
    let lexer = ToyLexer::new(char_stream::from_str("x = 3 * 0 + 2 * 0;"));
    let mut stream = BufferedTokenStream::new(lexer);
    stream.fill().unwrap();
    assert_eq!(stream.text_in(Interval::of(4, 8)).unwrap(), "3 * 0");
    assert_eq!(stream.text_in(Interval::of(0, 100)).unwrap(), "x = 3 * 0 + 2 * 0;");
    let ints: Vec<_> = stream
        .tokens_in(0, 17, Some(&[INT][..]))
        .unwrap()
        .into_iter()
        .map(Token::token_index)
        .collect();
    assert_eq!(ints, [4, 8, 12, 16]);
}

#[test]
fn unicode_identifiers_keep_code_point_offsets() {
    let lexer = ToyLexer::new(char_stream::from_str("héllo wörld"));
    let mut stream = BufferedTokenStream::on_default_channel(lexer);
    stream.fill().unwrap();
    let world = stream.get(2).unwrap();
    assert_eq!(world.start_index(), 6);
    assert_eq!(world.stop_index(), 10);
    assert_eq!(world.text().unwrap(), "wörld");
}

#[test]
fn reading_from_a_reader() {
    let input = char_stream::from_reader_named("a+1".as_bytes(), "reader").unwrap();
    let mut stream = BufferedTokenStream::new(ToyLexer::new(input));
    assert_eq!(types(&mut stream), [ID, OP, INT, EOF]);
    assert_eq!(stream.get(0).unwrap().origin().source_name(), Some("reader"));
}
