use pdf_export::Opener;
use std::io;
use std::path::Path;
use std::process::Command;

/// Opens files with the platform's launcher
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open_path(&self, path: &Path) -> io::Result<()> {
        launch(path)
    }

    fn show_in_folder(&self, path: &Path) -> io::Result<()> {
        if cfg!(target_os = "macos") {
            Command::new("open").arg("-R").arg(path).spawn()?;
            return Ok(());
        }
        if cfg!(target_os = "windows") {
            Command::new("explorer")
                .arg(format!("/select,{}", path.display()))
                .spawn()?;
            return Ok(());
        }
        launch(path.parent().unwrap_or(Path::new(".")))
    }
}

fn launch(path: &Path) -> io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command.arg(path).spawn()?;
    Ok(())
}

#[cfg(feature = "dialog")]
pub use dialog::NativeDialog;

#[cfg(feature = "dialog")]
mod dialog {
    use pdf_export::{SaveDialog, SaveRequest};
    use std::path::PathBuf;

    /// Save dialog backed by the platform's file chooser
    pub struct NativeDialog;

    impl SaveDialog for NativeDialog {
        fn save(&self, request: &SaveRequest) -> Option<PathBuf> {
            let mut dialog = rfd::FileDialog::new();
            for filter in &request.filters {
                dialog = dialog.add_filter(&filter.name, &filter.extensions);
            }
            if let Some(dir) = request.default_path.parent().filter(|dir| dir.is_dir()) {
                dialog = dialog.set_directory(dir);
            }
            if let Some(name) = request.default_path.file_name() {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
            dialog.save_file()
        }
    }
}
