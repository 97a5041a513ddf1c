use crate::internal_prelude::*;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

pub trait PathExt {
    /// removes the base from the path
    fn unbase(&self, base: &Utf8Path) -> Result<Utf8PathBuf>;

    /// removes the src_root from the path and adds the dest_root
    fn rebase(&self, src_root: &Utf8Path, dest_root: &Utf8Path) -> Result<Utf8PathBuf>;

    fn is_ext_any(&self, exts: &[&str]) -> bool;

    fn starts_with_any(&self, of: &[Utf8PathBuf]) -> bool;

    /// drops `.` components and folds `name/..` pairs without touching the filesystem
    fn normalized(&self) -> Utf8PathBuf;
}

impl PathExt for Utf8Path {
    fn unbase(&self, base: &Utf8Path) -> Result<Utf8PathBuf> {
        self.strip_prefix(base)
            .map(|p| p.to_path_buf())
            .map_err(|_| eyre!("Could not remove base {base:?} from {self:?}"))
    }

    fn rebase(&self, src_root: &Utf8Path, dest_root: &Utf8Path) -> Result<Utf8PathBuf> {
        let rel = self.unbase(src_root)?;
        Ok(dest_root.join(rel))
    }

    fn is_ext_any(&self, exts: &[&str]) -> bool {
        self.extension()
            .map(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn starts_with_any(&self, of: &[Utf8PathBuf]) -> bool {
        of.iter().any(|p| self.starts_with(p))
    }

    fn normalized(&self) -> Utf8PathBuf {
        let mut out = Utf8PathBuf::new();
        for comp in self.components() {
            match comp {
                Utf8Component::CurDir => {}
                Utf8Component::ParentDir => match out.components().next_back() {
                    Some(Utf8Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                    _ => out.push(".."),
                },
                comp => out.push(comp.as_str()),
            }
        }
        out
    }
}

pub trait PathBufExt {
    /// drops the last path component
    fn without_last(self) -> Utf8PathBuf;
}

impl PathBufExt for Utf8PathBuf {
    fn without_last(mut self) -> Utf8PathBuf {
        self.pop();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebase_moves_relative_part() {
        let file = Utf8PathBuf::from("/site/app/common/fonts/a.woff");
        let to = file
            .rebase(Utf8Path::new("/site/app"), Utf8Path::new("/site/build"))
            .unwrap();
        assert_eq!(to, Utf8PathBuf::from("/site/build/common/fonts/a.woff"));
    }

    #[test]
    fn unbase_outside_base_fails() {
        let file = Utf8PathBuf::from("/other/a.css");
        assert!(file.unbase(Utf8Path::new("/site")).is_err());
    }

    #[test]
    fn ext_matching_ignores_case() {
        assert!(Utf8Path::new("style/MAIN.LESS").is_ext_any(&["less", "css"]));
        assert!(!Utf8Path::new("style/main").is_ext_any(&["less"]));
    }

    #[test]
    fn normalized_folds_dots() {
        assert_eq!(Utf8Path::new("./build").normalized(), "build");
        assert_eq!(Utf8Path::new("build/./prod/").normalized(), "build/prod");
        assert_eq!(Utf8Path::new("out/../build").normalized(), "build");
        assert_eq!(Utf8Path::new("../shared/build").normalized(), "../shared/build");
        assert_eq!(Utf8Path::new("/site/../build").normalized(), "/build");
        assert_eq!(Utf8Path::new("/..").normalized(), "/");
        assert_eq!(Utf8Path::new(".").normalized(), "");
    }
}
