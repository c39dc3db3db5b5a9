use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A recipe as returned by the recipe provider and stored in favorites.
///
/// The provider's JSON is loosely shaped, so every field tolerates a missing
/// or mistyped value and falls back to its default. Whether the result is
/// worth showing is decided by [`Recipe::is_displayable`].
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Recipe {
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub description: String,
    #[serde(default, deserialize_with = "or_default")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "or_default")]
    pub time: String,
    #[serde(default, deserialize_with = "or_default")]
    pub servings: Servings,
    #[serde(default, deserialize_with = "or_default")]
    pub budget: String,
    #[serde(default, deserialize_with = "or_default")]
    pub nutrition: Nutrition,
    #[serde(default, deserialize_with = "lenient_list")]
    pub ingredients: Vec<IngredientLine>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub instructions: Vec<String>,
}

impl Recipe {
    /// A recipe may enter application state only with a title and at least one step.
    pub fn is_displayable(&self) -> bool {
        !self.title.trim().is_empty() && !self.instructions.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Servings {
    Count(u64),
    Text(String),
}

impl Default for Servings {
    fn default() -> Self {
        Servings::Text(String::new())
    }
}

impl Servings {
    pub fn is_empty(&self) -> bool {
        matches!(self, Servings::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for Servings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Servings::Count(count) => write!(f, "{}", count),
            Servings::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Nutrition {
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub calories: Option<NutritionValue>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub protein: Option<NutritionValue>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub carbs: Option<NutritionValue>,
    #[serde(default, deserialize_with = "or_default", skip_serializing_if = "Option::is_none")]
    pub fats: Option<NutritionValue>,
}

/// Models answer with either `450` or `"450 kcal"`; both are kept as given.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum NutritionValue {
    Amount(f64),
    Text(String),
}

impl fmt::Display for NutritionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NutritionValue::Amount(amount) => write!(f, "{}", amount),
            NutritionValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One line of the ingredient list: `{quantity, item}` or free text.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum IngredientLine {
    Measured {
        #[serde(default, deserialize_with = "or_default")]
        quantity: String,
        item: String,
    },
    Plain(String),
}

impl fmt::Display for IngredientLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngredientLine::Measured { quantity, item } if quantity.is_empty() => {
                write!(f, "{}", item)
            }
            IngredientLine::Measured { quantity, item } => write!(f, "{} {}", quantity, item),
            IngredientLine::Plain(text) => write!(f, "{}", text),
        }
    }
}

/// Deserializes `T`, substituting `T::default()` for null or mistyped values.
/// Numbers are accepted where strings are expected, and a number `T` cannot
/// hold as a number (`2.5` servings) is kept as its text.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Number(number) = &value else {
        return Ok(serde_json::from_value(value).unwrap_or_default());
    };
    let text = Value::String(number.to_string());
    if is_string_target::<T>() {
        return Ok(serde_json::from_value(text).unwrap_or_default());
    }
    Ok(serde_json::from_value(value)
        .or_else(|_| serde_json::from_value(text))
        .unwrap_or_default())
}

fn is_string_target<T: serde::de::DeserializeOwned>() -> bool {
    serde_json::from_value::<T>(Value::String(String::new())).is_ok()
        && serde_json::from_value::<T>(Value::from(0)).is_err()
}

/// Deserializes a list, dropping the elements that do not fit `T`.
/// Anything other than an array becomes an empty list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
