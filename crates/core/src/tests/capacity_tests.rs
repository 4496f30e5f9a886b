// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{create_test_catalog, create_test_facility};
use crate::{CapacityProvider, Catalog};
use fieldbook_domain::{DomainError, FacilityId, FieldType};

#[test]
fn test_catalog_capacity_and_price() {
    let catalog: Catalog = create_test_catalog();
    let facility_id: FacilityId = FacilityId::new("norte").unwrap();
    let field_type: FieldType = FieldType::new("5v5").unwrap();

    assert_eq!(catalog.capacity(&facility_id, &field_type).unwrap(), 2);
    assert_eq!(
        catalog
            .price_per_hour(&facility_id, &field_type)
            .unwrap()
            .cents(),
        2500
    );
}

#[test]
fn test_catalog_unknown_facility() {
    let catalog: Catalog = create_test_catalog();
    let result = catalog.capacity(
        &FacilityId::new("sur").unwrap(),
        &FieldType::new("5v5").unwrap(),
    );
    assert!(matches!(result, Err(DomainError::FacilityNotFound(_))));
}

#[test]
fn test_catalog_unknown_field_type() {
    let catalog: Catalog = create_test_catalog();
    let facility_id: FacilityId = FacilityId::new("norte").unwrap();
    let field_type: FieldType = FieldType::new("11v11").unwrap();

    assert!(matches!(
        catalog.capacity(&facility_id, &field_type),
        Err(DomainError::UnknownFieldType { .. })
    ));
    assert!(matches!(
        catalog.price_per_hour(&facility_id, &field_type),
        Err(DomainError::UnknownFieldType { .. })
    ));
}

#[test]
fn test_catalog_rejects_duplicate_ids() {
    let result = Catalog::new(vec![create_test_facility(), create_test_facility()]);
    assert!(matches!(result, Err(DomainError::InvalidFacilityId(_))));
}

#[test]
fn test_catalog_lists_facilities() {
    let catalog: Catalog = create_test_catalog();
    assert_eq!(catalog.len(), 1);
    assert!(!catalog.is_empty());
    assert_eq!(catalog.facilities()[0].id().as_str(), "norte");
    assert!(Catalog::default().is_empty());
}
