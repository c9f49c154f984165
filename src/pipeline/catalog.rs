use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Class labels of the PlantVillage leaf dataset, in the output order of the
/// reference plant-disease model.
pub const PLANT_VILLAGE_CLASSES: &[&str] = &[
    "Pepper__bell___Bacterial_spot",
    "Pepper__bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Tomato_Bacterial_spot",
    "Tomato_Early_blight",
    "Tomato_Late_blight",
    "Tomato_Leaf_Mold",
    "Tomato_Septoria_leaf_spot",
    "Tomato_Spider_mites_Two_spotted_spider_mite",
    "Tomato__Target_Spot",
    "Tomato__Tomato_YellowLeaf__Curl_Virus",
    "Tomato__Tomato_mosaic_virus",
    "Tomato___healthy",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("class catalog is empty")]
    Empty,

    #[error("class catalog contains a blank class id at index {0}")]
    BlankId(usize),

    #[error("class catalog lists {0:?} more than once")]
    Duplicate(String),
}

/// Ordered class ids, index-aligned with the classifier's output layer.
///
/// Fixed at deployment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassCatalog {
    classes: Vec<String>,
}

impl ClassCatalog {
    /// Builds a catalog, rejecting empty lists, blank ids and duplicates.
    pub fn new<I, S>(classes: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, class) in classes.iter().enumerate() {
            if class.trim().is_empty() {
                return Err(CatalogError::BlankId(index));
            }
            if !seen.insert(class.as_str()) {
                return Err(CatalogError::Duplicate(class.clone()));
            }
        }
        Ok(ClassCatalog { classes })
    }

    pub fn plant_village() -> Self {
        ClassCatalog {
            classes: PLANT_VILLAGE_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}
