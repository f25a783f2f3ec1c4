/// Remove ARPAbet stress-digit suffixes ("AH0" -> "AH").
pub fn strip_stress(phoneme: &str) -> String {
    phoneme.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Relative duration weight for a stress-stripped ARPAbet phoneme.
///
/// Vowels and diphthongs are typically longer than consonants; stops are
/// shortest. Unknown symbols weigh 1.0.
pub fn duration_weight(base_phoneme: &str) -> f64 {
    match base_phoneme {
        // Stops
        "P" | "B" | "T" | "D" | "K" | "G" => 0.4,
        // Affricates
        "CH" | "JH" => 0.5,
        // Fricatives
        "F" | "V" | "S" | "Z" => 0.6,
        "TH" | "DH" | "SH" | "ZH" => 0.7,
        "HH" => 0.5,
        // Nasals
        "M" | "N" | "NG" => 0.7,
        // Liquids
        "L" | "R" => 0.8,
        // Glides
        "W" | "Y" => 0.6,
        // Short vowels
        "IH" | "EH" | "AH" | "UH" => 0.8,
        "AE" => 0.9,
        // Long vowels
        "IY" | "EY" | "AA" | "AO" | "OW" | "UW" | "ER" => 1.0,
        // Diphthongs
        "AY" | "AW" | "OY" => 1.2,
        _ => 1.0,
    }
}

/// Weight lookup for a phoneme that may still carry a stress digit.
pub(crate) fn weight_of(phoneme: &str) -> f64 {
    duration_weight(&strip_stress(phoneme))
}
