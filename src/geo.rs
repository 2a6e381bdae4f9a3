use once_cell::sync::Lazy;
use std::collections::HashMap;

// Static lookup for city + country coordinates (no external geocoding).
// Keyed as "City, Country" with the human-readable country name.
static CITY_COORDS: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        // -------- SWEDEN --------
        ("Stockholm, Sweden", (59.3293, 18.0686)),
        ("Gothenburg, Sweden", (57.7089, 11.9746)),
        ("Göteborg, Sweden", (57.7089, 11.9746)), // alt spelling
        ("Malmö, Sweden", (55.60498, 13.00382)),
        ("Uppsala, Sweden", (59.8586, 17.6389)),
        ("Västerås, Sweden", (59.6099, 16.5448)),
        ("Örebro, Sweden", (59.2753, 15.2134)),
        ("Linköping, Sweden", (58.4108, 15.6214)),
        ("Helsingborg, Sweden", (56.0465, 12.6945)),
        ("Lund, Sweden", (55.7047, 13.1910)),
        ("Umeå, Sweden", (63.8258, 20.2630)),
        ("Luleå, Sweden", (65.5848, 22.1547)),
        ("Gävle, Sweden", (60.6749, 17.1413)),
        ("Jönköping, Sweden", (57.7815, 14.1562)),
        ("Karlstad, Sweden", (59.3793, 13.5036)),
        ("Sundsvall, Sweden", (62.3908, 17.3069)),
        ("Eskilstuna, Sweden", (59.3712, 16.5098)),
        ("Norrköping, Sweden", (58.5877, 16.1924)),
        ("Borås, Sweden", (57.7210, 12.9401)),
        // -------- NORWAY --------
        ("Oslo, Norway", (59.9139, 10.7522)),
        ("Bergen, Norway", (60.3913, 5.3221)),
        ("Trondheim, Norway", (63.4305, 10.3951)),
        ("Stavanger, Norway", (58.9690, 5.7331)),
        ("Tromsø, Norway", (69.6492, 18.9553)),
        ("Kristiansand, Norway", (58.1467, 7.9956)),
        ("Drammen, Norway", (59.7439, 10.2045)),
        ("Fredrikstad, Norway", (59.2181, 10.9298)),
        ("Bodø, Norway", (67.2804, 14.4049)),
        ("Ålesund, Norway", (62.4722, 6.1549)),
        ("Sandnes, Norway", (58.8524, 5.7352)),
        ("Narvik, Norway", (68.4385, 17.4273)),
    ])
});

// Country centroids, used when only the country is known
static COUNTRY_COORDS: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([("Sweden", (62.0, 15.0)), ("Norway", (64.5, 11.0))])
});

/// Resolve coordinates for a record: exact "City, Country" match first,
/// then the country centroid, else None.
pub fn resolve_coords(city: Option<&str>, country: Option<&str>) -> Option<(f64, f64)> {
    if let (Some(city), Some(country)) = (city, country) {
        let key = format!("{}, {}", city, country);
        if let Some(&coords) = CITY_COORDS.get(key.as_str()) {
            return Some(coords);
        }
    }
    country.and_then(|c| COUNTRY_COORDS.get(c).copied())
}

/// Map a configured source country code to a human-readable name.
/// Unsupported codes pass through so the record stays inspectable.
pub fn country_name(code: &str) -> String {
    match code.to_uppercase().as_str() {
        "SE" => "Sweden".to_string(),
        "NO" => "Norway".to_string(),
        _ => code.to_string(),
    }
}
