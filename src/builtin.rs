//! Built-in export transaction services.

use crate::config::{ErrorEcho, FieldRule, HeaderEcho, MessageStyle, ServiceConfig};

/// Dates written as `DD/MM/YYYY`.
pub const DATE_DD_MM_YYYY: &str = r"\d{2}/\d{2}/\d{4}";

pub const EFIRC_ADJUSTMENT: &str = "efirc-adjustment";
pub const EFIRC_ISSUANCE: &str = "efirc-issuance";
pub const IRM_ADJUSTMENT: &str = "irm-adjustment";
pub const IRM_EXTENSION: &str = "irm-extension";
pub const SHIPPING_BILL_ADJUSTMENT: &str = "shipping-bill-adjustment";
pub const SHIPPING_BILL_EXTENSION: &str = "shipping-bill-extension";

/// All built-in service definitions.
pub fn services() -> Vec<ServiceConfig> {
    vec![
        efirc_adjustment(),
        efirc_issuance(),
        irm_adjustment(),
        irm_extension(),
        shipping_bill_adjustment(),
        shipping_bill_extension(),
    ]
}

fn service(name: &str, description: &str, exhaustive: bool, rules: Vec<FieldRule>) -> ServiceConfig {
    ServiceConfig {
        name: name.to_string(),
        description: description.to_string(),
        enabled: true,
        success_file: format!("{}-success.json", name),
        fail_file: format!("{}-failure.json", name),
        exhaustive,
        messages: MessageStyle::Collapsed,
        echo_header: None,
        echo_errors: None,
        internal_error: "Internal Server Error".to_string(),
        rules,
    }
}

/// Mandatory, at most `max` characters, with a code and label.
fn coded(field: &str, max: usize, code: &str, label: &str) -> FieldRule {
    FieldRule::mandatory(field).max(max).code(code).label(label)
}

pub fn efirc_adjustment() -> ServiceConfig {
    let rules = vec![
        coded("fircNumber", 50, "EF_HDR_001", "FIRC Number"),
        coded("adCode", 7, "EF_HDR_002", "AD Code"),
        coded("remitterCurrency", 3, "EF_HDR_003", "Closure Currency"),
        coded("adjustedAmount", 16, "EF_HDR_004", "Closure Amount"),
        coded("approvalBy", 1, "EF_HDR_005", "Approval By"),
        coded("adjustmentDate", 10, "ED_HDR_087", "Adjustment Date"),
        coded("reasonForAdjustment", 1, "EF_HDR_006", "Reason For Adjustment"),
        coded("adjustmentSeqNumber", 50, "EF_HDR_007", "Closure Sequence Number"),
        coded("recordIndicator", 1, "EF_HDR_008", "Record Indicator"),
    ];

    ServiceConfig {
        messages: MessageStyle::Detailed,
        echo_header: Some(HeaderEcho::default()),
        echo_errors: Some(ErrorEcho::default()),
        internal_error: "Internal transformer error".to_string(),
        ..service(EFIRC_ADJUSTMENT, "eFIRC adjustment", true, rules)
    }
}

pub fn efirc_issuance() -> ServiceConfig {
    let rules = vec![
        FieldRule::mandatory("irmNumber").max(30),
        FieldRule::mandatory("irmAdCode").exact(7),
        FieldRule::mandatory("fircFlag").exact(1),
        FieldRule::mandatory("fircNumber").max(30),
        FieldRule::mandatory("fircIssueDate").exact(10),
        FieldRule::mandatory("fircAmount").max(20),
        FieldRule::mandatory("recordIndicator").exact(1),
    ];

    service(EFIRC_ISSUANCE, "eFIRC issuance", false, rules)
}

pub fn irm_adjustment() -> ServiceConfig {
    let rules = vec![
        FieldRule::mandatory("irmNumber").max(30),
        FieldRule::mandatory("remittanceAdCode").max(7),
        FieldRule::mandatory("ieCode").max(10),
        FieldRule::mandatory("adjustmentSeqNumber").max(50),
        FieldRule::mandatory("reasonForAdjustment").max(2),
        FieldRule::mandatory("adjustedAmount").max(16),
        FieldRule::mandatory("remitterCurrency").max(3),
        FieldRule::mandatory("adjustmentDate").exact(10),
        FieldRule::mandatory("approvalBy").max(1),
        FieldRule::mandatory("recordIndicator").max(1),
        FieldRule::optional("letterNo").max(10),
        FieldRule::optional("docNumber").max(10),
        FieldRule::optional("docDate").max(10),
        FieldRule::optional("docPort").max(6),
    ];

    ServiceConfig {
        internal_error: "Internal Transformer Error".to_string(),
        ..service(IRM_ADJUSTMENT, "IRM adjustment", false, rules)
    }
}

pub fn irm_extension() -> ServiceConfig {
    let rules = vec![
        FieldRule::mandatory("irmNumber").max(50),
        FieldRule::mandatory("irmADCode").max(7),
        FieldRule::mandatory("ieCode").max(10),
        FieldRule::mandatory("extensionIndicator").max(1),
        FieldRule::mandatory("recordIndicator").max(1),
        FieldRule::mandatory("extensionDate").pattern(DATE_DD_MM_YYYY),
        FieldRule::mandatory("letterNumber")
            .max(50)
            .when_trimmed("extensionIndicator", "1"),
        FieldRule::mandatory("letterDate")
            .pattern(DATE_DD_MM_YYYY)
            .when_trimmed("extensionIndicator", "1"),
    ];

    ServiceConfig {
        internal_error: "IRM Extension transformer error".to_string(),
        ..service(IRM_EXTENSION, "IRM extension", true, rules)
    }
}

pub fn shipping_bill_adjustment() -> ServiceConfig {
    let rules = vec![
        FieldRule::mandatory("exportType").exact(1).one_of(["1", "2"]),
        FieldRule::mandatory("portCode").exact(6),
        FieldRule::mandatory("leoDate").exact(10),
        FieldRule::mandatory("adCode").exact(7),
        FieldRule::mandatory("recordIndicator").exact(1),
        FieldRule::mandatory("ieCode").exact(10),
        FieldRule::mandatory("writeoffReferenceNumber").max(30),
        FieldRule::mandatory("adjustmentIndicator").max(2),
        FieldRule::mandatory("writeOffDate").exact(10),
        FieldRule::mandatory("shipmentInd").max(2),
        // goods
        FieldRule::mandatory("shippingBillNo").exact(7).when("exportType", "1"),
        FieldRule::mandatory("shippingBillDate").exact(10).when("exportType", "1"),
        // softex
        FieldRule::mandatory("formNo").max(20).when("exportType", "2"),
        // re-import / re-export
        FieldRule::optional("billOfEntryNumber").max(7),
        FieldRule::optional("billOfEntryDate").max(10),
        FieldRule::optional("portOfDischarge").max(6),
        FieldRule::mandatory("invoiceList[0].invoiceSerialNo").max(10),
        FieldRule::mandatory("invoiceList[0].invoiceNumber").max(10),
        FieldRule::mandatory("invoiceList[0].invoiceDate").exact(10),
        FieldRule::mandatory("invoiceList[0].writeoffAmount").max(20),
        FieldRule::mandatory("invoiceList[0].invoiceClosureIndicator").exact(1),
    ];

    service(SHIPPING_BILL_ADJUSTMENT, "Shipping bill adjustment", false, rules)
}

pub fn shipping_bill_extension() -> ServiceConfig {
    let rules = vec![
        FieldRule::mandatory("exportType").exact(1),
        FieldRule::mandatory("portCode").exact(6),
        FieldRule::mandatory("shippingBillNo").exact(7),
        FieldRule::mandatory("shippingBillDate").exact(10),
        FieldRule::mandatory("leoDate").exact(10),
        FieldRule::mandatory("adCode").exact(7),
        FieldRule::mandatory("ieCode").exact(10),
        FieldRule::mandatory("recordIndicator").exact(1),
        FieldRule::mandatory("extensionBy").exact(1),
        FieldRule::mandatory("extensionDate").exact(10),
        FieldRule::mandatory("letterNumber").exact(10),
        FieldRule::mandatory("letterDate").exact(10),
        FieldRule::mandatory("formNo").exact(20).when("exportType", "2"),
    ];

    ServiceConfig {
        internal_error: "Transformer Error".to_string(),
        ..service(SHIPPING_BILL_EXTENSION, "Shipping bill extension", true, rules)
    }
}
