//! Maps a judge language label (e.g. `"C++14 (GCC 5.4.1)"`) to the file name
//! its source is archived under.

use tracing::warn;

/// Every archived source file name starts with this.
pub const SOURCE_FILE_PREFIX: &str = "Main.";

/// File name used when the label matches nothing in [`LANGUAGES`].
pub const FALLBACK_FILE_NAME: &str = "Main.txt";

#[derive(Debug, Clone, Copy)]
enum Pattern {
    /// Any label starting with the string, e.g. `C++14`, `PyPy3`.
    Prefix(&'static str),
    /// The label itself, optionally followed by a space and a version (`C# 11.0`).
    Name(&'static str),
}

impl Pattern {
    fn matches(self, label: &str) -> bool {
        match self {
            Pattern::Prefix(prefix) => label.starts_with(prefix),
            Pattern::Name(name) => match label.strip_prefix(name) {
                Some(rest) => rest.is_empty() || rest.starts_with(' '),
                None => false,
            },
        }
    }
}

// Order matters where one name is a prefix of another (Perl6 before Perl).
const LANGUAGES: &[(Pattern, &str)] = &[
    (Pattern::Prefix("C++"), "Main.cpp"),
    (Pattern::Prefix("Bash"), "Main.sh"),
    (Pattern::Name("C"), "Main.c"),
    (Pattern::Name("C#"), "Main.cs"),
    (Pattern::Name("Clojure"), "Main.clj"),
    (Pattern::Prefix("Common Lisp"), "Main.lisp"),
    (Pattern::Name("D"), "Main.d"),
    (Pattern::Name("Fortran"), "Main.f08"),
    (Pattern::Name("Go"), "Main.go"),
    (Pattern::Name("Haskell"), "Main.hs"),
    (Pattern::Name("JavaScript"), "Main.js"),
    (Pattern::Name("Java"), "Main.java"),
    (Pattern::Name("OCaml"), "Main.ml"),
    (Pattern::Name("Pascal"), "Main.pas"),
    (Pattern::Name("Perl6"), "Main.p6"),
    (Pattern::Name("Perl"), "Main.pl"),
    (Pattern::Name("PHP"), "Main.php"),
    (Pattern::Prefix("Python"), "Main.py"),
    (Pattern::Prefix("PyPy"), "Main.py"),
    (Pattern::Name("Ruby"), "Main.rb"),
    (Pattern::Name("Scala"), "Main.scala"),
    (Pattern::Name("Scheme"), "Main.scm"),
    (Pattern::Name("Text"), "Main.txt"),
    (Pattern::Name("Visual Basic"), "Main.vb"),
    (Pattern::Name("Objective-C"), "Main.m"),
    (Pattern::Name("Swift"), "Main.swift"),
    (Pattern::Name("Rust"), "Main.rs"),
    (Pattern::Name("Sed"), "Main.sed"),
    (Pattern::Name("Awk"), "Main.awk"),
    (Pattern::Name("Brainfuck"), "Main.bf"),
    (Pattern::Name("Standard ML"), "Main.sml"),
    (Pattern::Name("Crystal"), "Main.cr"),
    (Pattern::Name("F#"), "Main.fs"),
    (Pattern::Name("Unlambda"), "Main.unl"),
    (Pattern::Name("LuaJIT"), "Main.lua"),
    (Pattern::Name("Lua"), "Main.lua"),
    (Pattern::Name("MoonScript"), "Main.moon"),
    (Pattern::Name("Ceylon"), "Main.ceylon"),
    (Pattern::Name("Julia"), "Main.jl"),
    (Pattern::Name("Octave"), "Main.m"),
    (Pattern::Name("Nim"), "Main.nim"),
    (Pattern::Name("TypeScript"), "Main.ts"),
    (Pattern::Name("Kotlin"), "Main.kt"),
    (Pattern::Name("COBOL"), "Main.cob"),
];

/// Strips the parenthesized compiler annotation and trailing whitespace.
fn base_name(label: &str) -> &str {
    label.split('(').next().unwrap_or_default().trim_end()
}

/// Resolves the archive file name for a judge language label.
///
/// Never fails: unknown labels fall back to [`FALLBACK_FILE_NAME`] and are
/// reported as an unrecognized-language event.
pub fn file_name_for(label: &str) -> &'static str {
    let name = base_name(label);
    match LANGUAGES.iter().find(|(pattern, _)| pattern.matches(name)) {
        Some((_, file_name)) => file_name,
        None => {
            warn!(
                language = %label,
                "[ARCHIVE] Unrecognized language, archiving as {FALLBACK_FILE_NAME}"
            );
            FALLBACK_FILE_NAME
        }
    }
}
