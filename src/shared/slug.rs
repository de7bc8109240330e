/// Turns free text into a lowercase, dash separated identifier.
///
/// Accented latin letters are folded to their ASCII base, every other
/// non-alphanumeric run collapses into a single `-`.
pub fn slugify(text: &str) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_dash = false;

  for c in text.chars().flat_map(char::to_lowercase) {
    let c = fold_accent(c);
    if c.is_ascii_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  slug
}

fn fold_accent(c: char) -> char {
  match c {
    'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
    'è' | 'é' | 'ê' | 'ë' => 'e',
    'ì' | 'í' | 'î' | 'ï' => 'i',
    'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
    'ù' | 'ú' | 'û' | 'ü' => 'u',
    'ç' => 'c',
    'ñ' => 'n',
    other => other,
  }
}
