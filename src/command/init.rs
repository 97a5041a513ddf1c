use crate::{config::DEFAULT_CONFIG, ext::fs, internal_prelude::*, logger::GRAY};
use camino::Utf8Path;

/// Writes the default configuration, never replacing an existing file.
pub async fn init(config_file: &Utf8Path) -> Result<()> {
    ensure!(
        !config_file.exists(),
        "Init found an existing {config_file}, remove it first to start over"
    );
    if let Some(dir) = config_file.parent().filter(|d| !d.as_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }
    fs::write(config_file, DEFAULT_CONFIG).await?;
    info!("Init wrote {}", GRAY.paint(config_file.as_str()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use camino::Utf8PathBuf;
    use temp_dir::TempDir;

    #[tokio::test]
    async fn writes_template_once() {
        let dir = TempDir::new().unwrap();
        let file = Utf8PathBuf::from_path_buf(dir.path().join("site/forge.toml")).unwrap();

        init(&file).await.unwrap();
        let written = std::fs::read_to_string(&file).unwrap();
        ProjectConfig::parse(&written).unwrap().validate().unwrap();

        std::fs::write(&file, "port = 1").unwrap();
        assert!(init(&file).await.is_err());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "port = 1");
    }
}
