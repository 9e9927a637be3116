//! This module defines the storage of per-event data products and the way a
//! cut declares which of them it is going to read

use crate::{candidate::CandidateKey, error::Error, Result};

use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt::{self, Display},
    marker::PhantomData,
    str::FromStr,
};

/// Identifier of a data product: producer label, instance name and process
///
/// Written as `label[:instance[:process]]`, missing parts being empty.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputTag {
    /// Label of the module which produced the data
    pub label: String,

    /// Name distinguishing several products of the same module
    pub instance: String,

    /// Name of the process which ran the producer
    pub process: String,
}
//
impl InputTag {
    /// Build an input tag which only specifies a producer label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Build an input tag which also specifies a product instance
    pub fn with_instance(label: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instance: instance.into(),
            ..Self::default()
        }
    }
}
//
impl FromStr for InputTag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let mut parts = s.trim().split(':');
        let label = parts.next().unwrap_or_default();
        if label.is_empty() {
            return Err("an input tag needs a producer label".to_owned());
        }
        let instance = parts.next().unwrap_or_default();
        let process = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err("an input tag has at most three components".to_owned());
        }
        Ok(Self {
            label: label.to_owned(),
            instance: instance.to_owned(),
            process: process.to_owned(),
        })
    }
}
//
impl Display for InputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)?;
        if !self.instance.is_empty() || !self.process.is_empty() {
            write!(f, ":{}", self.instance)?;
        }
        if !self.process.is_empty() {
            write!(f, ":{}", self.process)?;
        }
        Ok(())
    }
}

/// Handle through which a data product that was declared as consumed can be
/// retrieved from each event
pub struct Token<T> {
    tag: InputTag,
    product: PhantomData<fn() -> T>,
}
//
impl<T> Token<T> {
    /// Input tag of the product which this token designates
    pub fn tag(&self) -> &InputTag {
        &self.tag
    }
}
//
// Manual impls, since derive would needlessly require T: Clone/Debug
impl<T> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            product: PhantomData,
        }
    }
}
//
impl<T> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token<{}>({})", type_name::<T>(), self.tag)
    }
}

/// Registry of the data products which the cuts of a job are going to read
#[derive(Debug, Default)]
pub struct ConsumesCollector {
    /// Declared products, in declaration order, without duplicates
    consumed: Vec<(InputTag, TypeId, &'static str)>,
}
//
impl ConsumesCollector {
    /// Set up an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that a product of type T labeled `tag` will be read
    pub fn consumes<T: Any>(&mut self, tag: InputTag) -> Token<T> {
        let type_id = TypeId::of::<T>();
        let already_known = self
            .consumed
            .iter()
            .any(|(known_tag, known_type, _)| *known_tag == tag && *known_type == type_id);
        if !already_known {
            log::debug!("Consuming {} `{}`", type_name::<T>(), tag);
            self.consumed.push((tag.clone(), type_id, type_name::<T>()));
        }
        Token {
            tag,
            product: PhantomData,
        }
    }

    /// List the declared products, as (tag, type name) pairs
    pub fn consumed(&self) -> impl Iterator<Item = (&InputTag, &'static str)> + '_ {
        self.consumed.iter().map(|(tag, _, name)| (tag, *name))
    }
}

/// Data products of one event, indexed by input tag
#[derive(Default)]
pub struct Event {
    products: HashMap<InputTag, Box<dyn Any + Send + Sync>>,
}
//
impl Event {
    /// Start an event with no data products
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a data product, replacing any previous product with this tag
    pub fn put<T: Any + Send + Sync>(&mut self, tag: InputTag, product: T) {
        self.products.insert(tag, Box::new(product));
    }

    /// Fetch a data product by its input tag
    pub fn get_by_label<T: Any>(&self, tag: &InputTag) -> Result<&T> {
        let product = self
            .products
            .get(tag)
            .ok_or_else(|| Error::ProductNotFound(tag.to_string()))?;
        let product: &(dyn Any + Send + Sync) = &**product;
        product.downcast_ref::<T>().ok_or_else(|| {
            Error::ProductTypeMismatch {
                tag: tag.to_string(),
                expected: type_name::<T>(),
            }
            .into()
        })
    }

    /// Fetch a data product through a token obtained at registration time
    pub fn get_by_token<T: Any>(&self, token: &Token<T>) -> Result<&T> {
        self.get_by_label(&token.tag)
    }
}

/// Association of one value to each candidate of a collection
#[derive(Clone, Debug, PartialEq)]
pub struct ValueMap<T> {
    values: HashMap<CandidateKey, T>,
}
//
impl<T> Default for ValueMap<T> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}
//
impl<T: Copy> ValueMap<T> {
    /// Build an empty value map
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a value to a candidate
    pub fn insert(&mut self, key: CandidateKey, value: T) {
        self.values.insert(key, value);
    }

    /// Look up the value associated with a candidate
    pub fn get(&self, key: CandidateKey) -> Result<T> {
        self.values
            .get(&key)
            .copied()
            .ok_or_else(|| Error::KeyNotFound(key.to_string()).into())
    }

    /// Number of candidates which have a value
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Truth that no candidate has a value
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
//
impl<T: Copy> FromIterator<(CandidateKey, T)> for ValueMap<T> {
    fn from_iter<I: IntoIterator<Item = (CandidateKey, T)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_tag_syntax() {
        let tag = "fixedGridRhoFastjetAll".parse::<InputTag>().unwrap();
        assert_eq!(tag, InputTag::new("fixedGridRhoFastjetAll"));
        assert_eq!(tag.to_string(), "fixedGridRhoFastjetAll");

        let tag = "photonIDValueMapProducer:phoPhotonIsolation"
            .parse::<InputTag>()
            .unwrap();
        assert_eq!(
            tag,
            InputTag::with_instance("photonIDValueMapProducer", "phoPhotonIsolation")
        );
        assert_eq!(tag.to_string(), "photonIDValueMapProducer:phoPhotonIsolation");

        let tag = "producer::RECO".parse::<InputTag>().unwrap();
        assert_eq!(tag.process, "RECO");
        assert_eq!(tag.to_string(), "producer::RECO");

        assert!("".parse::<InputTag>().is_err());
        assert!("a:b:c:d".parse::<InputTag>().is_err());
    }

    #[test]
    fn consumes_deduplicates() {
        let mut cc = ConsumesCollector::new();
        let rho = InputTag::new("rho");
        let t1 = cc.consumes::<f64>(rho.clone());
        let t2 = cc.consumes::<f64>(rho.clone());
        cc.consumes::<ValueMap<f32>>(rho.clone());
        assert_eq!(t1.tag(), t2.tag());
        assert_eq!(cc.consumed().count(), 2);
    }

    #[test]
    fn product_lookup() {
        let mut cc = ConsumesCollector::new();
        let rho_token = cc.consumes::<f64>(InputTag::new("rho"));
        let mut event = Event::new();
        event.put(InputTag::new("rho"), 12.5f64);
        assert_eq!(*event.get_by_token(&rho_token).unwrap(), 12.5);

        let err = event
            .get_by_label::<f64>(&InputTag::new("other"))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::ProductNotFound("other".to_owned()))
        );

        let err = event
            .get_by_label::<ValueMap<f32>>(&InputTag::new("rho"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ProductTypeMismatch { .. })
        ));
    }

    #[test]
    fn value_map_lookup() {
        let present = CandidateKey::new(1, 0);
        let absent = CandidateKey::new(1, 1);
        let map = [(present, 3.5f32)].into_iter().collect::<ValueMap<_>>();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(present).unwrap(), 3.5);
        let err = map.get(absent).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::KeyNotFound(_))));
    }
}
