//! Semicolon-separated export of city rows.

use std::io::Write;

use recensement_core::view::CityRow;

use crate::Result;

pub const CSV_HEADER: [&str; 4] =
  ["NOM VILLE", "POPULATION", "CODE DEPARTEMENT", "NOM DEPARTEMENT"];

/// Write `rows` as CSV into `sink`. An unknown department name is written as
/// an empty field.
pub fn write_csv<W: Write>(rows: &[CityRow], sink: W) -> Result<()> {
  let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);
  wtr.write_record(CSV_HEADER)?;

  for row in rows {
    let population = row.nombre_habitants.to_string();
    wtr.write_record([
      row.nom_ville.as_str(),
      population.as_str(),
      row.code_departement.as_str(),
      row.nom_departement.as_deref().unwrap_or(""),
    ])?;
  }

  wtr.flush()?;
  Ok(())
}

pub fn render_csv(rows: &[CityRow]) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  write_csv(rows, &mut buf)?;
  Ok(buf)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(nom: &str, n: u64, nom_departement: Option<&str>) -> CityRow {
    CityRow {
      nom_ville:        nom.into(),
      nombre_habitants: n,
      code_departement: "34".into(),
      nom_departement:  nom_departement.map(Into::into),
    }
  }

  #[test]
  fn header_and_rows_use_semicolons() {
    let out = render_csv(&[
      row("Montpellier", 285_121, Some("Hérault")),
      row("Sète", 44_558, None),
    ])
    .unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines, [
      "NOM VILLE;POPULATION;CODE DEPARTEMENT;NOM DEPARTEMENT",
      "Montpellier;285121;34;Hérault",
      "Sète;44558;34;",
    ]);
  }

  #[test]
  fn fields_containing_the_delimiter_are_quoted() {
    let out = render_csv(&[row("A;B", 1, None)]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("\"A;B\";1;34;"));
  }

  #[test]
  fn empty_input_still_has_a_header() {
    let out = render_csv(&[]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().collect::<Vec<_>>(), [CSV_HEADER.join(";")]);
  }

  struct Broken;

  impl Write for Broken {
    fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
      Err(std::io::Error::other("sink closed"))
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
  }

  #[test]
  fn sink_failures_surface() {
    let rows = [row("Montpellier", 1, None)];
    assert!(write_csv(&rows, Broken).is_err());
  }
}
