#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tokenweave::{
    BufferedTokenStream, CommonToken, Interval, ListTokenSource, RewriteError, TokenStreamRewriter,
};

#[derive(Debug, Arbitrary)]
enum Edit {
    InsertBefore(u8, String),
    InsertAfter(u8, String),
    Replace(u8, u8, String),
    Delete(u8, u8),
    Rollback(u8),
    Render(u8, u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    text: String,
    edits: Vec<Edit>,
}

fuzz_target!(|input: Input| {
    let tokens: Vec<CommonToken> = input
        .text
        .chars()
        .take(64)
        .map(|c| CommonToken::with_text(1, c.encode_utf8(&mut [0; 4])))
        .collect();
    let expected: String = input.text.chars().take(64).collect();
    let source: ListTokenSource = ListTokenSource::new(tokens);
    let mut stream = BufferedTokenStream::new(source);
    stream.fill().unwrap();
    let mut rewriter = TokenStreamRewriter::new(stream);
    assert_eq!(rewriter.text().unwrap(), expected);

    for edit in input.edits {
        let recorded = match edit {
            Edit::InsertBefore(i, text) => rewriter.insert_before(usize::from(i), text),
            Edit::InsertAfter(i, text) => rewriter.insert_after(usize::from(i), text),
            Edit::Replace(a, b, text) => rewriter.replace(usize::from(a), usize::from(b), text),
            Edit::Delete(a, b) => rewriter.delete(usize::from(a), usize::from(b)),
            Edit::Rollback(n) => {
                rewriter.rollback(usize::from(n));
                Ok(())
            }
            Edit::Render(a, b) => {
                // Conflicts are reported, never panicked on.
                let _ = rewriter.text_range(Interval::of(isize::from(a), isize::from(b)));
                Ok(())
            }
        };
        match recorded {
            Ok(()) | Err(RewriteError::InvalidRange { .. }) => {}
            Err(e) => panic!("unexpected error recording edit: {e}"),
        }
    }

    // Rendering twice gives the same answer: programs are not consumed.
    let first = rewriter.text().map_err(|e| e.to_string());
    let second = rewriter.text().map_err(|e| e.to_string());
    assert_eq!(first, second);

    rewriter.delete_program();
    assert_eq!(rewriter.text().unwrap(), expected);
});
