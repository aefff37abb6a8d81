// src/build/cart.rs

//! Text-level handling of the `.p8` cartridge format.
//!
//! A cart is a short header followed by sections introduced by lines such as
//! `__lua__`, `__gfx__` or `__map__`. The builder only ever rewrites the
//! `__lua__` section; every other section is carried over byte for byte.

/// First line of every `.p8` file.
pub const CART_HEADER: &str = "pico-8 cartridge // http://www.pico-8.com";

/// Format version written into freshly created carts.
pub const CART_VERSION: u32 = 41;

pub const LUA_SECTION: &str = "__lua__";

/// Line PICO-8 uses to split the code editor into tabs.
pub const TAB_SEPARATOR: &str = "-->8";

/// True for section markers like `__gfx__`, `__lua__` or `__meta:title__`.
pub fn is_section_header(line: &str) -> bool {
    let line = line.trim_end();
    if line.len() <= 4 || !line.starts_with("__") || !line.ends_with("__") {
        return false;
    }
    let name = &line[2..line.len() - 2];
    name.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == ':' || c == '_')
}

/// Join source files into one code section, one editor tab per file.
pub fn join_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> String {
    sources
        .into_iter()
        .map(|src| src.trim_end_matches(['\r', '\n']))
        .collect::<Vec<_>>()
        .join(format!("\n{TAB_SEPARATOR}\n").as_str())
}

/// Contents of a brand new cart holding only `lua`.
pub fn new_cart(lua: &str) -> String {
    let mut out = format!("{CART_HEADER}\nversion {CART_VERSION}\n{LUA_SECTION}\n");
    push_code(&mut out, lua);
    out
}

/// Replace the `__lua__` section of `existing` with `lua`.
///
/// If the cart has no code section yet, one is inserted right after the
/// header, ahead of the first data section.
pub fn splice_lua(existing: &str, lua: &str) -> String {
    let lines: Vec<&str> = existing.lines().collect();
    let mut out = String::with_capacity(existing.len() + lua.len());

    let lua_idx = lines.iter().position(|l| l.trim_end() == LUA_SECTION);
    let (head_end, tail_start) = match lua_idx {
        Some(idx) => {
            let next = lines[idx + 1..]
                .iter()
                .position(|l| is_section_header(l))
                .map(|offset| idx + 1 + offset)
                .unwrap_or(lines.len());
            (idx, next)
        }
        None => {
            let first = lines
                .iter()
                .position(|l| is_section_header(l))
                .unwrap_or(lines.len());
            (first, first)
        }
    };

    for line in &lines[..head_end] {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(LUA_SECTION);
    out.push('\n');
    push_code(&mut out, lua);
    for line in &lines[tail_start..] {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn push_code(out: &mut String, lua: &str) {
    if lua.is_empty() {
        return;
    }
    out.push_str(lua);
    if !lua.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXISTING: &str = "pico-8 cartridge // http://www.pico-8.com\n\
version 38\n\
__lua__\n\
print(\"old\")\n\
__gfx__\n\
00000000\n\
__sfx__\n\
010100000\n";

    #[test]
    fn section_headers_are_recognised() {
        assert!(is_section_header("__lua__"));
        assert!(is_section_header("__gfx__"));
        assert!(is_section_header("__gff__ "));
        assert!(is_section_header("__meta:title__"));
        assert!(is_section_header("__meta:cart_info_end__"));
        assert!(!is_section_header("____"));
        assert!(!is_section_header("_____"));
        assert!(!is_section_header("-- __init__ hook"));
        assert!(!is_section_header("__Init__"));
    }

    #[test]
    fn sources_are_joined_with_tab_separator() {
        let joined = join_sources(["a = 1\n", "b = 2"]);
        assert_eq!(joined, "a = 1\n-->8\nb = 2");
    }

    #[test]
    fn new_cart_has_header_and_code() {
        let cart = new_cart("x = 1");
        assert_eq!(
            cart,
            "pico-8 cartridge // http://www.pico-8.com\nversion 41\n__lua__\nx = 1\n"
        );
    }

    #[test]
    fn splice_replaces_only_the_code_section() {
        let cart = splice_lua(EXISTING, "print(\"new\")");
        assert!(cart.contains("version 38\n__lua__\nprint(\"new\")\n__gfx__\n00000000\n"));
        assert!(cart.ends_with("__sfx__\n010100000\n"));
        assert!(!cart.contains("old"));
    }

    #[test]
    fn splice_inserts_code_section_when_missing() {
        let existing = "pico-8 cartridge // http://www.pico-8.com\nversion 38\n__gfx__\n0000\n";
        let cart = splice_lua(existing, "x = 1");
        assert_eq!(
            cart,
            "pico-8 cartridge // http://www.pico-8.com\nversion 38\n__lua__\nx = 1\n__gfx__\n0000\n"
        );
    }

    #[test]
    fn splice_keeps_meta_section_after_code() {
        let existing = "pico-8 cartridge // http://www.pico-8.com\nversion 41\n\
__lua__\nold()\n__meta:title__\nmy game\nby me\n__gfx__\n0000\n";
        let cart = splice_lua(existing, "new()");
        assert!(cart.contains("__lua__\nnew()\n__meta:title__\nmy game\nby me\n__gfx__\n"));
        assert!(!cart.contains("old()"));
    }

    #[test]
    fn splice_handles_code_section_at_end_of_file() {
        let existing = "pico-8 cartridge // http://www.pico-8.com\nversion 38\n__lua__\nold()\n";
        let cart = splice_lua(existing, "new()");
        assert!(cart.ends_with("__lua__\nnew()\n"));
    }
}
