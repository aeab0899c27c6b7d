use quiz_core::{Category, Question};

fn opts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Built-in question pool used when no external question source is wired in.
#[must_use]
pub fn sample_questions() -> Vec<Question> {
    let rust = Category::new("Rust");
    let net = Category::new("Networking");
    let db = Category::new("Databases");

    vec![
        Question::choice(
            "Which trait must a type implement to be moved across threads?",
            opts(&["Sync", "Send", "Copy", "Unpin"]),
            1,
        )
        .with_category(rust.clone()),
        Question::choice(
            "What does `?` do on an `Err` value?",
            opts(&["Panics", "Returns it early", "Ignores it", "Logs it"]),
            1,
        )
        .with_category(rust.clone()),
        Question::multi_choice(
            "Which of these are smart pointers in the standard library?",
            opts(&["Box", "Rc", "Vec", "Arc"]),
            vec![0, 1, 3],
        )
        .with_category(rust.clone()),
        Question::boolean("A `&mut T` can coexist with a `&T` to the same value.", false)
            .with_category(rust.clone()),
        Question::text(
            "Explain what the borrow checker enforces.",
            "At any time a value has either one mutable reference or any number of shared references, and no reference outlives its owner.",
            opts(&["mutable", "shared", "reference", "lifetime", "owner"]),
        )
        .with_category(rust.clone()),
        Question::text(
            "What is the difference between `String` and `&str`?",
            "`String` is an owned, growable heap buffer while `&str` is a borrowed slice of UTF-8 bytes.",
            opts(&["owned", "borrowed", "heap", "slice", "utf-8"]),
        )
        .with_category(rust),
        Question::choice(
            "Which transport protocol does HTTP/3 run on?",
            opts(&["TCP", "SCTP", "QUIC", "DCCP"]),
            2,
        )
        .with_category(net.clone()),
        Question::multi_choice(
            "Which TCP flags take part in the three-way handshake?",
            opts(&["SYN", "FIN", "ACK", "RST"]),
            vec![0, 2],
        )
        .with_category(net.clone()),
        Question::boolean("UDP guarantees in-order delivery.", false).with_category(net.clone()),
        Question::text(
            "Describe what a TLS handshake establishes.",
            "The client and server agree on a cipher suite, authenticate the server certificate and derive shared session keys.",
            opts(&["cipher", "certificate", "key", "authenticate", "session"]),
        )
        .with_category(net),
        Question::choice(
            "Which isolation level prevents phantom reads?",
            opts(&["Read committed", "Repeatable read", "Serializable", "Read uncommitted"]),
            2,
        )
        .with_category(db.clone()),
        Question::boolean("A B-tree index keeps keys in sorted order.", true)
            .with_category(db.clone()),
        Question::text(
            "What does a write-ahead log provide?",
            "Changes are appended to a durable log before the data pages are modified, so the database can recover after a crash.",
            opts(&["durable", "log", "before", "recover", "crash"]),
        )
        .with_category(db),
    ]
}
