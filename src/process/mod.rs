// src/process/mod.rs

pub mod decompress;
pub mod entry;
pub mod filter;
pub mod row;

use csv::ReaderBuilder;
use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};
use tracing::{info, instrument};

use crate::error::{CatalogError, Result};

pub use entry::CatalogEntry;
pub use filter::{Catalog, CatalogProcessor, CatalogStats};
pub use row::RawRow;

/// Streams a header-keyed catalog CSV through the visibility filter.
///
/// Records that cannot be decoded are dropped and counted; only I/O failures
/// abort the pass.
pub fn process_csv<R: Read>(reader: R, mag_limit: f64) -> Result<Catalog> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut processor = CatalogProcessor::new(mag_limit);

    for result in rdr.deserialize::<RawRow>() {
        match result {
            Ok(row) => processor.process_row(&row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => processor.skip_malformed(),
        }
    }

    let catalog = processor.finalize();
    info!(
        rows = catalog.stats.rows_seen,
        visible = catalog.stats.rows_retained,
        "catalog processed"
    );
    Ok(catalog)
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn process_csv_file(path: &Path, mag_limit: f64) -> Result<Catalog> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CatalogError::MissingInputFile {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    process_csv(file, mag_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,stella_catalog::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const SAMPLE: &str = r#""id","hip","proper","ra","dec","dist","mag","spect","con"
0,,"Sol",0.000000,0.000000,0.0000,-26.700,"G2V",""
1,1,"",0.000060,1.089009,219.7802,9.100,"F5",Psc
7574,7588,"Achernar",1.628556,-57.236757,42.7533,0.450,"B3Vpe",Eri
32263,32349,"Sirius",6.752481,-16.716116,2.6371,-1.440,"A0m...",CMa
27919,27989,"Betelgeuse",5.919529,7.407063,152.6718,0.450,"M2Ib",Ori
91262,91262,"Vega",18.615649,38.783692,7.6787,0.030,"A0Vvar",Lyr
99999,,"",bad,12.0,,3.000,"",""
100000,,"",10.0,,,3.000,"",""
100001,,"",200.0,5.0,,6.499,"K0",Cyg
"#;

    #[test]
    fn filters_sorts_and_enriches_sample() -> Result<()> {
        init_test_logging();
        let catalog = process_csv(SAMPLE.as_bytes(), 6.5)?;

        assert_eq!(catalog.stats.rows_seen, 9);
        assert_eq!(catalog.stats.rows_retained, 6);
        assert_eq!(catalog.stats.named, 5);
        assert_eq!(catalog.stats.with_distance, 4);

        let names: Vec<_> = catalog
            .entries
            .iter()
            .map(|e| e.name.as_deref().unwrap_or("Unnamed"))
            .collect();
        assert_eq!(
            names,
            vec!["Sol", "Sirius", "Vega", "Achernar", "Betelgeuse", "Unnamed"]
        );

        for pair in catalog.entries.windows(2) {
            assert!(pair[0].mag <= pair[1].mag);
        }
        for e in &catalog.entries {
            assert!(e.mag < 6.5);
            assert!((0.0..360.0).contains(&e.ra));
        }

        let sirius = &catalog.entries[1];
        assert_eq!(sirius.id, 32263);
        assert_eq!(sirius.constellation.as_deref(), Some("CMa"));
        assert_eq!(sirius.dist_ly.as_deref(), Some("8.6"));

        // Sol has a zero distance and an empty constellation
        let sol = &catalog.entries[0];
        assert_eq!(sol.dist, None);
        assert_eq!(sol.constellation, None);

        let cyg = catalog.entries.last().unwrap();
        assert_eq!(cyg.ra, 200.0);
        assert_eq!(cyg.spectral.as_deref(), Some("K0"));
        Ok(())
    }

    #[test]
    fn missing_optional_columns_are_tolerated() -> Result<()> {
        let csv = "id,ra,dec,mag\n5,10,20,1.5\n6,10,20\n";
        let catalog = process_csv(csv.as_bytes(), 6.5)?;
        assert_eq!(catalog.stats.rows_seen, 2);
        assert_eq!(catalog.entries.len(), 1);
        let e = &catalog.entries[0];
        assert_eq!(e.ra, 150.0);
        assert_eq!(e.name, None);
        assert_eq!(e.dist_ly, None);
        Ok(())
    }

    #[test]
    fn undecodable_records_are_skipped() -> Result<()> {
        let mut bytes = b"id,ra,dec,mag,proper\n1,1,1,1,ok\n2,1,1,1,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe]);
        bytes.extend_from_slice(b"\n3,1,1,2,fine\n");
        let catalog = process_csv(&bytes[..], 6.5)?;
        assert_eq!(catalog.stats.rows_seen, 3);
        assert_eq!(catalog.entries.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_file_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let err = process_csv_file(&dir.path().join("absent.csv"), 6.5).unwrap_err();
        assert!(matches!(err, CatalogError::MissingInputFile { .. }));
        Ok(())
    }
}
