use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::{Error, Map};
use fnv::FnvHashSet;
use std::borrow::Cow;


pub trait IdxNameMap {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>>;

  fn name_to_index(&self, name: &str) -> Result<usize>;

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool { self.len() == 0 }

  fn check_idx(&self, idx: usize) -> Result<()> {
    if self.len() <= idx {
      Err(Error::IndexOutOfRange.into())
    } else {
      Ok(())
    }
  }
}


impl<'a, D: IdxNameMap> IdxNameMap for &'a D {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    D::index_to_name(self, idx)
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    D::name_to_index(self, name)
  }

  fn len(&self) -> usize {
    D::len(self)
  }
}

pub trait Dataset: IdxNameMap + Sync {
  type Instance;
  fn load_instance(&self, idx: usize) -> Result<Self::Instance>;

  /// Loads every instance, in index order.
  fn load_all(&self) -> Result<Vec<Self::Instance>> {
    (0..self.len()).map(|idx| self.load_instance(idx)).collect()
  }
}


impl<'a, D: Dataset> Dataset for &'a D {
  type Instance = D::Instance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    D::load_instance(self, idx)
  }
}


/// Relative directories are looked up under `DATA_ROOT` when it is set.
fn resolve_dir(dir: impl AsRef<Path>) -> PathBuf {
  let dir = dir.as_ref();
  match std::env::var_os("DATA_ROOT") {
    Some(root) if dir.is_relative() => Path::new(&root).join(dir),
    _ => dir.to_path_buf(),
  }
}


/// A Standard Layout Dataset: a directory containing instance files and `INDEX.txt` index file.
/// The index file contains a whitespace separated list of instance names, which acts as a map from index -> name.
/// Each instance file is named `NAME.SUFFIX`.
pub struct StdLayout<D> {
  _marker: PhantomData<D>,
  name_order: Vec<String>,
  name_to_idx_map: Map<String, usize>,
  dir: PathBuf,
  suffix: String,
}


impl<D> StdLayout<D> {
  pub fn new(dir: impl AsRef<Path>, suffix: &str) -> Result<StdLayout<D>> {
    let dir = resolve_dir(dir);
    let ctx = format!("try read directory {:?}", &dir);
    let dir = dir.canonicalize().context(ctx)?;

    let contents = std::fs::read_to_string(dir.join("INDEX.txt"))
      .with_context(|| format!("try read index file in {:?}", &dir))?;
    let name_order: Vec<String> = contents.split_whitespace().map(|s| s.trim().to_string()).collect();
    let name_to_idx_map: Map<_, _> = name_order.iter().enumerate().map(|(i, s)| (s.clone(), i)).collect();

    Ok(StdLayout {
      _marker: PhantomData {},
      name_order,
      name_to_idx_map,
      dir,
      suffix: suffix.to_string(),
    })
  }

  fn instance_path(&self, idx: usize) -> Result<PathBuf> {
    let mut path = self.dir.join(&*self.index_to_name(idx)?);
    path.set_extension(&self.suffix);
    Ok(path)
  }
}

impl<D> IdxNameMap for StdLayout<D> {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    self.check_idx(idx)?;
    Ok(Cow::Borrowed(&self.name_order[idx]))
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    self.name_to_idx_map.get(name).ok_or_else(|| Error::UnkownInstanceName.into()).map(|i| *i)
  }

  fn len(&self) -> usize { self.name_order.len() }
}


/// A Dynamic Layout Dataset: every file in a directory matching a glob pattern, in sorted path order.
/// Instance names are the file stems.
pub struct DynLayout<D> {
  _marker: PhantomData<D>,
  name_order: Vec<PathBuf>,
  name_to_idx_map: Map<String, usize>,
}

impl<D> DynLayout<D> {
  pub fn new(dir: impl AsRef<Path>, patt: &str) -> Result<Self> {
    let dir = resolve_dir(dir);

    let mut p = dir.to_string_lossy().into_owned();
    p.push('/');
    p.push_str(patt);

    let names : std::result::Result<Vec<PathBuf>, _> = glob::glob(&p)?.collect();
    let mut name_order = names?;
    name_order.sort();
    let name_to_idx_map: Result<Map<_, _>> = name_order.iter()
      .enumerate()
      .map(|(k, p)| {
        let n = p.file_stem().ok_or_else(|| anyhow::anyhow!("missing file stem: {:?}", p))?;
        Ok((n.to_string_lossy().into_owned(), k))
      })
      .collect();
    let name_to_idx_map = name_to_idx_map?;
    Ok(DynLayout {
      _marker: Default::default(),
      name_order,
      name_to_idx_map
    })
  }

  fn instance_path(&self, idx: usize) -> Result<&Path> {
    self.check_idx(idx)?;
    Ok(&self.name_order[idx])
  }
}

impl<D> IdxNameMap for DynLayout<D> {
  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    let name = self.instance_path(idx)?.file_stem()
      .ok_or_else(|| anyhow::anyhow!("missing file stem for idx {}", idx))?;
    Ok(name.to_string_lossy())
  }

  fn name_to_index(&self, name: &str) -> Result<usize> {
    let idx = *self.name_to_idx_map.get(name).ok_or(Error::UnkownInstanceName)?;
    Ok(idx)
  }

  fn len(&self) -> usize { self.name_order.len() }
}


pub struct Subset<D> {
  dataset: D,
  indices: Vec<usize>,
  index_set: FnvHashSet<usize>,
}

impl<D: IdxNameMap> Subset<D> {
  pub fn new(dataset: D, indices: Vec<usize>) -> Result<Self> {
    for &i in &indices {
      dataset.check_idx(i).with_context(|| format!("index {} out of range (0..{})", i, dataset.len()))?;
    }
    let index_set: FnvHashSet<_> = indices.iter().cloned().collect();
    if index_set.len() != indices.len() {
      return crate::invalid("subset indices must be unique".to_string());
    }
    Ok(Subset { dataset, indices, index_set })
  }

  fn map_index(&self, idx: usize) -> Result<usize> {
    self.indices.get(idx).copied().ok_or_else(|| Error::IndexOutOfRange.into())
  }
}

impl<D: IdxNameMap> IdxNameMap for Subset<D> {
  fn name_to_index(&self, name: &str) -> Result<usize> {
    let idx = self.dataset.name_to_index(name)?;
    if self.index_set.contains(&idx) {
      self.indices.iter().position(|&i| i == idx).ok_or_else(|| Error::UnkownInstanceName.into())
    } else {
      Err(Error::UnkownInstanceName.into())
    }
  }

  fn index_to_name(&self, idx: usize) -> Result<Cow<str>> {
    self.dataset.index_to_name(self.map_index(idx)?)
  }

  fn len(&self) -> usize { self.indices.len() }
}

impl<I, D: Dataset<Instance=I>> Dataset for Subset<D> {
  type Instance = I;
  fn load_instance(&self, idx: usize) -> Result<I> {
    self.dataset.load_instance(self.map_index(idx)?)
  }
}


pub mod section;


#[cfg(test)]
pub(crate) fn sample_route_dir() -> PathBuf {
  Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/sample_route")
}
