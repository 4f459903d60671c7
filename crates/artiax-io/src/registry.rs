//! Known particle list formats, looked up by name, nickname or extension.

use std::path::{Path, PathBuf};

use artiax_model::{MotlRecord, ParticleData, ParticleList, PixelSizes};
use log::debug;

use crate::error::{RegistryError, Result};
use crate::stopgap::{self, StopgapRecord};

pub type OpenFn = fn(&Path, PixelSizes) -> Result<Box<dyn ParticleList>>;
pub type CreateFn = fn(PixelSizes) -> Result<Box<dyn ParticleList>>;

/// One registered format and the functions that build lists in it.
#[derive(Debug, Clone, Copy)]
pub struct ParticleFormat {
    pub name: &'static str,
    pub nicks: &'static [&'static str],
    /// File extensions without the dot, lower case.
    pub extensions: &'static [&'static str],
    pub open: OpenFn,
    pub create: CreateFn,
    pub writable: bool,
}

impl ParticleFormat {
    /// Format handled by the record type `R`.
    pub fn of<R: MotlRecord>(
        nicks: &'static [&'static str],
        extensions: &'static [&'static str],
    ) -> Self {
        Self {
            name: R::FORMAT_NAME,
            nicks,
            extensions,
            open: open_list::<R>,
            create: create_list::<R>,
            writable: true,
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.nicks.iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

fn open_list<R: MotlRecord>(path: &Path, pixel_sizes: PixelSizes) -> Result<Box<dyn ParticleList>> {
    pixel_sizes.validate()?;
    let mut data = ParticleData::<R>::read_file(path)?;
    data.set_pixel_sizes(pixel_sizes)?;
    Ok(Box::new(data))
}

fn create_list<R: MotlRecord>(pixel_sizes: PixelSizes) -> Result<Box<dyn ParticleList>> {
    let mut data = ParticleData::<R>::new();
    data.set_pixel_sizes(pixel_sizes)?;
    Ok(Box::new(data))
}

#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: Vec<ParticleFormat>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every format this crate implements.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ParticleFormat::of::<StopgapRecord>(
            &["stopgap", "star", "motl", "motivelist"],
            &["star"],
        ));
        registry
    }

    pub fn register(&mut self, format: ParticleFormat) {
        debug!("registering particle list format `{}`", format.name);
        self.formats.push(format);
    }

    pub fn formats(&self) -> &[ParticleFormat] {
        &self.formats
    }

    /// Case-insensitive lookup by full name or nickname.
    pub fn get(&self, name: &str) -> Result<&ParticleFormat> {
        self.formats
            .iter()
            .find(|f| f.matches(name))
            .ok_or_else(|| RegistryError::UnknownFormat(name.to_string()))
    }

    /// Every accepted name and nickname, in registration order.
    pub fn aliases(&self) -> Vec<&'static str> {
        self.formats
            .iter()
            .flat_map(|f| std::iter::once(f.name).chain(f.nicks.iter().copied()))
            .collect()
    }

    pub fn by_extension(&self, path: &Path) -> Option<&ParticleFormat> {
        let ext = path.extension()?.to_str()?;
        self.formats
            .iter()
            .find(|f| f.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Format named explicitly, or the one owning the extension of `path`.
    pub fn resolve(&self, name: Option<&str>, path: &Path) -> Result<&ParticleFormat> {
        match name {
            Some(name) => self.get(name),
            None => self
                .by_extension(path)
                .ok_or_else(|| RegistryError::UnknownFormat(path.display().to_string())),
        }
    }

    pub fn open(
        &self,
        name: &str,
        path: &Path,
        pixel_sizes: PixelSizes,
    ) -> Result<Box<dyn ParticleList>> {
        (self.get(name)?.open)(path, pixel_sizes)
    }

    pub fn create(&self, name: &str, pixel_sizes: PixelSizes) -> Result<Box<dyn ParticleList>> {
        (self.get(name)?.create)(pixel_sizes)
    }

    /// Writes `list` in format `name`. Lists are never converted between
    /// formats, so `name` must be the list's own format.
    pub fn save(
        &self,
        list: &dyn ParticleList,
        name: &str,
        path: Option<&Path>,
    ) -> Result<PathBuf> {
        let format = self.get(name)?;
        if !format.writable {
            return Err(RegistryError::NotWritable(format.name));
        }
        if list.format_name() != format.name {
            return Err(RegistryError::FormatMismatch {
                list: list.format_name(),
                requested: format.name,
            });
        }
        Ok(list.write_file(path)?)
    }
}

/// Name of the built-in STOPGAP format.
pub const STOPGAP: &str = stopgap::FORMAT_NAME;
