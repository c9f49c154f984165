use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Medium,
    High,
    Critical,
}

/// Agronomy notes shown next to a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiseaseInfo {
    pub plant: &'static str,
    pub name: &'static str,
    pub severity: Severity,
    pub symptoms: &'static str,
    pub treatment: &'static str,
    pub prevention: &'static str,
}

const fn info(
    plant: &'static str,
    name: &'static str,
    severity: Severity,
    symptoms: &'static str,
    treatment: &'static str,
    prevention: &'static str,
) -> DiseaseInfo {
    DiseaseInfo { plant, name, severity, symptoms, treatment, prevention }
}

const NO_SYMPTOMS: &str = "No visible disease symptoms";
const KEEP_CARING: &str = "Continue current care practices";

/// Notes for the PlantVillage classes, keyed by class id.
static DISEASES: &[(&str, DiseaseInfo)] = &[
    ("Pepper__bell___Bacterial_spot", info(
        "Bell Pepper", "Bacterial Spot", Severity::Medium,
        "Dark brown spots with yellow halos on leaves",
        "Apply copper-based fungicides, improve air circulation, avoid overhead watering",
        "Use disease-resistant varieties, crop rotation, proper spacing",
    )),
    ("Pepper__bell___healthy", info(
        "Bell Pepper", "Healthy", Severity::None, NO_SYMPTOMS, KEEP_CARING,
        "Maintain good garden hygiene and proper watering",
    )),
    ("Potato___Early_blight", info(
        "Potato", "Early Blight", Severity::High,
        "Dark concentric rings on leaves, starting from lower leaves",
        "Apply fungicides containing chlorothalonil or mancozeb",
        "Crop rotation, avoid overhead irrigation, remove plant debris",
    )),
    ("Potato___Late_blight", info(
        "Potato", "Late Blight", Severity::Critical,
        "Water-soaked lesions with white fuzzy growth on leaf undersides",
        "Apply systemic fungicides immediately, remove affected plants",
        "Plant resistant varieties, ensure good drainage, avoid wet conditions",
    )),
    ("Potato___healthy", info(
        "Potato", "Healthy", Severity::None, NO_SYMPTOMS, KEEP_CARING,
        "Maintain proper soil health and watering schedule",
    )),
    ("Tomato_Bacterial_spot", info(
        "Tomato", "Bacterial Spot", Severity::Medium,
        "Small dark spots with yellow halos, may cause defoliation",
        "Apply copper-based bactericides, improve ventilation",
        "Use certified seeds, avoid working with wet plants",
    )),
    ("Tomato_Early_blight", info(
        "Tomato", "Early Blight", Severity::High,
        "Brown spots with concentric rings, yellowing leaves",
        "Apply fungicides, remove affected leaves, improve air circulation",
        "Mulching, drip irrigation, crop rotation",
    )),
    ("Tomato_Late_blight", info(
        "Tomato", "Late Blight", Severity::Critical,
        "Water-soaked lesions, white mold on leaf undersides",
        "Apply systemic fungicides immediately, destroy affected plants",
        "Use resistant varieties, avoid overhead watering",
    )),
    ("Tomato_Leaf_Mold", info(
        "Tomato", "Leaf Mold", Severity::Medium,
        "Yellow spots on upper leaf surface, fuzzy growth underneath",
        "Improve ventilation, apply fungicides, reduce humidity",
        "Ensure good air circulation, avoid overcrowding",
    )),
    ("Tomato_Septoria_leaf_spot", info(
        "Tomato", "Septoria Leaf Spot", Severity::Medium,
        "Small circular spots with dark borders and light centers",
        "Apply fungicides, remove affected leaves, mulch soil",
        "Avoid overhead watering, practice crop rotation",
    )),
    ("Tomato_Spider_mites_Two_spotted_spider_mite", info(
        "Tomato", "Spider Mites", Severity::Medium,
        "Fine webbing, stippled leaves, yellowing",
        "Apply miticides, increase humidity, use beneficial insects",
        "Regular monitoring, avoid water stress",
    )),
    ("Tomato__Target_Spot", info(
        "Tomato", "Target Spot", Severity::Medium,
        "Concentric ring patterns on leaves and fruit",
        "Apply fungicides, improve air circulation, remove debris",
        "Crop rotation, avoid overhead irrigation",
    )),
    ("Tomato__Tomato_YellowLeaf__Curl_Virus", info(
        "Tomato", "Yellow Leaf Curl Virus", Severity::Critical,
        "Yellowing and curling of leaves, stunted growth",
        "Remove infected plants, control whitefly vectors",
        "Use virus-resistant varieties, control whiteflies",
    )),
    ("Tomato__Tomato_mosaic_virus", info(
        "Tomato", "Mosaic Virus", Severity::High,
        "Mottled green and yellow patterns on leaves",
        "Remove infected plants, disinfect tools",
        "Use resistant varieties, practice good sanitation",
    )),
    ("Tomato___healthy", info(
        "Tomato", "Healthy", Severity::None, NO_SYMPTOMS, KEEP_CARING,
        "Maintain proper nutrition and watering",
    )),
];

/// Notes for `class_id`, `None` for classes outside the PlantVillage set.
pub fn lookup(class_id: &str) -> Option<&'static DiseaseInfo> {
    DISEASES.iter().find(|(id, _)| *id == class_id).map(|(_, info)| info)
}
