// Helpers shared by the bench binaries in this directory.
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* **content** and `code`.\n\n\
                > quoted [link](http://example.com)\n\n- Bullet point\n  - Nested item\n- Another item\n\n\
                | a | b |\n|---|--:|\n| 1 | 2 |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_nested_quotes(depth: usize) -> String {
    format!("{} deep\n", ">".repeat(depth))
}
