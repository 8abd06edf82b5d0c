//! Lexical path normalization
//!
//! TeX engines record input paths the way they were opened, so the same file may
//! appear as `./chapter.tex`, `/doc/./chapter.tex` or `C:\doc\chapter.tex`. These
//! helpers bring such spellings to a common form without touching the filesystem.

/// Normalize a path string for comparison.
///
/// Backslashes become slashes, empty and `.` segments are dropped and `..` removes
/// the preceding segment where there is one. A leading `/` is preserved.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn drops_current_dir_segments() {
        assert_eq!(normalize("/doc/./main.tex"), "/doc/main.tex");
        assert_eq!(normalize("./main.tex"), "main.tex");
    }

    #[test]
    fn resolves_parent_segments() {
        assert_eq!(normalize("/doc/sub/../main.tex"), "/doc/main.tex");
        assert_eq!(normalize("../main.tex"), "../main.tex");
        assert_eq!(normalize("/../main.tex"), "/main.tex");
    }

    #[test]
    fn unifies_separators() {
        assert_eq!(normalize("C:\\doc\\main.tex"), "C:/doc/main.tex");
        assert_eq!(normalize("/doc//main.tex/"), "/doc/main.tex");
    }
}
