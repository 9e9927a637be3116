//! Mechanism for loading the named parameters that configure a cut

use crate::{error::Error, event::InputTag, numeric::Float, Result};

use eyre::WrapErr;

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Named configuration parameters of a cut
///
/// On disk, this is a text file with one `name value` pair per line. The value
/// is the rest of the line after the name, with surrounding whitespace
/// removed. Blank lines and lines starting with `#` are ignored.
///
#[derive(Clone, Debug, Default)]
pub struct ParameterSet {
    /// Raw parameter values, indexed by name
    values: BTreeMap<String, String>,

    /// Directory against which relative file paths are resolved
    base_dir: PathBuf,
}
//
impl ParameterSet {
    /// Build an empty parameter set, resolving files from `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            values: BTreeMap::new(),
            base_dir: base_dir.into(),
        }
    }

    /// Load a parameter set from a file
    ///
    /// Relative file paths in the parameters will be resolved with respect to
    /// the directory where this file lives.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read parameter file {}", path.display()))?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_str_with_base(&text, base_dir)
            .wrap_err_with(|| format!("Failed to parse parameter file {}", path.display()))
    }

    /// Parse a parameter set from text, resolving files from `base_dir`
    pub fn from_str_with_base(text: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut params = Self::new(base_dir);
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (name, value) = match line.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (line, ""),
            };
            params.insert(name, value)?;
        }
        Ok(params)
    }

    /// Add a parameter, refusing to overwrite an existing one
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if self.values.contains_key(name) {
            return Err(Error::DuplicateParameter(name.to_owned()).into());
        }
        self.values.insert(name.to_owned(), value.into());
        Ok(())
    }

    /// Truth that a parameter with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Fetch a floating-point parameter
    pub fn get_float(&self, name: &'static str) -> Result<Float> {
        self.item(name)?.parse::<Float>()
    }

    /// Fetch a boolean parameter
    pub fn get_bool(&self, name: &'static str) -> Result<bool> {
        self.item(name)?.parse_bool()
    }

    /// Fetch a string parameter
    pub fn get_string(&self, name: &'static str) -> Result<String> {
        Ok(self.item(name)?.data.to_owned())
    }

    /// Fetch a parameter designating a data product
    pub fn get_input_tag(&self, name: &'static str) -> Result<InputTag> {
        self.item(name)?.parse::<InputTag>()
    }

    /// Fetch a parameter designating an existing file
    pub fn get_file_in_path(&self, name: &'static str) -> Result<PathBuf> {
        let item = self.item(name)?;
        let path = Path::new(item.data);
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        if !full_path.is_file() {
            return Err(item.invalid(format!("file {} does not exist", full_path.display())));
        }
        Ok(full_path)
    }

    /// Look up a raw parameter value
    fn item(&self, name: &'static str) -> Result<ConfigItem<'_>> {
        self.values
            .get(name)
            .map(|data| ConfigItem::new(name, data))
            .ok_or_else(|| Error::MissingParameter(name.to_owned()).into())
    }
}

/// A value from the parameter set, tagged with its parameter name for error
/// reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a parameter name and raw data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::fmt::Display,
    {
        self.data
            .parse::<T>()
            .map_err(|e| self.invalid(e.to_string()))
    }

    /// Parse this data as a boolean, also accepting Fortran's bool syntax
    fn parse_bool(self) -> Result<bool> {
        match self.data.to_lowercase().as_str() {
            "true" | ".true." => Ok(true),
            "false" | ".false." => Ok(false),
            _ => Err(self.invalid("expected true or false".to_owned())),
        }
    }

    /// Report that this item holds an unacceptable value
    fn invalid(&self, reason: String) -> eyre::Report {
        Error::InvalidParameter {
            name: self.name.to_owned(),
            value: self.data.to_owned(),
            reason,
        }
        .into()
    }
}
