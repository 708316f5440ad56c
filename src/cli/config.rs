use colored::Colorize;

use crate::error::{PainelError, Result};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

/// Changes requested on the command line; `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub data_file: Option<String>,
    pub currency: Option<String>,
    pub columns: Option<usize>,
    pub export_dir: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.data_file.is_none()
            && self.currency.is_none()
            && self.columns.is_none()
            && self.export_dir.is_none()
    }

    pub fn apply(self, settings: &mut Settings) -> Result<()> {
        if let Some(columns) = self.columns {
            if columns == 0 {
                return Err(PainelError::Settings("gallery columns must be at least 1".into()));
            }
            settings.gallery_columns = columns;
        }
        if let Some(file) = self.data_file {
            settings.data_file = file;
        }
        if let Some(currency) = self.currency {
            settings.currency = currency;
        }
        if let Some(dir) = self.export_dir {
            settings.export_dir = Some(dir);
        }
        Ok(())
    }
}

pub fn format_settings(settings: &Settings) -> String {
    let columns = settings.gallery_columns.to_string();
    let export_dir = settings.export_dir().display().to_string();
    [
        ("Data file", settings.data_file.as_str()),
        ("Currency", settings.currency.as_str()),
        ("Gallery columns", columns.as_str()),
        ("Export directory", export_dir.as_str()),
    ]
    .iter()
    .map(|(label, value)| format!("{:<18}{value}", format!("{label}:")))
    .collect::<Vec<_>>()
    .join("\n")
}

pub fn run(update: ConfigUpdate) -> Result<()> {
    let mut settings = load_settings();
    if !update.is_empty() {
        update.apply(&mut settings)?;
        save_settings(&settings)?;
        println!("{}", format!("Saved {}", settings_path().display()).green());
    }
    println!("{}", format_settings(&settings));
    Ok(())
}
