//! Field tables for the two layouts.
//!
//! Each entry is `(label, sources in priority order, format)`. Sources are
//! JSON pointers into the upstream detail object.

use super::format::FieldFormat::{self, *};

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub sources: &'static [&'static str],
    pub format: FieldFormat,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    /// Top-level heading.
    pub group: &'static str,
    /// Card heading within the group. Same as `group` in the chat layout.
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

const fn field(
    label: &'static str,
    sources: &'static [&'static str],
    format: FieldFormat,
) -> FieldSpec {
    FieldSpec {
        label,
        sources,
        format,
    }
}

const ENGINE_NUMBER: FieldSpec = field(
    "Engine Number",
    &["/engineNo"],
    MaskedEngine {
        unmasked: &["/full_details/engineNo"],
    },
);
const REGISTRATION_NUMBER: FieldSpec = field("Registration Number", &["/registrationNumber"], Text);
const REGISTRATION_DATE: FieldSpec = field("Registration Date", &["/registeredAt"], Date);
const REGISTERED_AT: FieldSpec = field("Registered At", &["/registeredPlace"], Text);
const OWNER_NAME: FieldSpec = field(
    "Owner Name",
    &["/rc_owner_name", "/rc_owner_name_masked"],
    Text,
);
const MAKE_MODEL: FieldSpec = field(
    "Make & Model",
    &["/brand/make_display", "/model/model_display"],
    MakeModel,
);
const VARIANT: FieldSpec = field(
    "Variant",
    &["/ds_details/0/variant/variant_display_name"],
    Text,
);
const VEHICLE_CLASS: FieldSpec = field("Vehicle Class", &["/vehicleClassDesc"], Text);
const FUEL_TYPE: FieldSpec = field("Fuel Type", &["/fuelType"], Text);
const COLOR: FieldSpec = field("Color", &["/color"], Text);
const SEATING: FieldSpec = field("Seating Capacity", &["/seatCap"], Suffixed(" seats"));
const BODY_TYPE: FieldSpec = field("Body Type", &["/full_details/bodyType"], Text);
const TRANSMISSION: FieldSpec = field(
    "Transmission",
    &[
        "/ds_details/0/variant/transmission_type",
        "/full_details/transmission",
    ],
    Text,
);
const CHASSIS_NUMBER: FieldSpec = field("Chassis Number", &["/chassisNoFull", "/chassisNo"], Text);
const CYLINDERS: FieldSpec = field("No. of Cylinders", &["/full_details/noOfCylinder"], Text);
const INSURANCE_COMPANY: FieldSpec = field("Insurance Company", &["/insuranceCompany"], Text);
const POLICY_NUMBER: FieldSpec = field("Policy Number", &["/insurancePolicyNo"], Text);
const INSURANCE_VALID: FieldSpec = field("Valid Till", &["/insuranceUpTo"], Date);
const RC_STATUS: FieldSpec = field("RC Status", &["/rcStatus"], Text);
const FITNESS_VALID: FieldSpec = field("Fitness Valid Till", &["/fitnessUpTo"], Date);
const PUC_VALID: FieldSpec = field("PUC Valid Till", &["/pucUpTo"], Date);
const HYPOTHECATION: FieldSpec = field("Hypothecation", &["/hypothecation"], Truthy);
const FINANCIER: FieldSpec = field("Financier", &["/financier"], Text);

/// Compact table sent by the chat bot.
pub static CHAT_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        group: "🚗 Basic Information",
        title: "🚗 Basic Information",
        fields: &[
            REGISTRATION_NUMBER,
            MAKE_MODEL,
            VARIANT,
            REGISTRATION_DATE,
            REGISTERED_AT,
            OWNER_NAME,
        ],
    },
    SectionSpec {
        group: "🔧 Vehicle Specifications",
        title: "🔧 Vehicle Specifications",
        fields: &[VEHICLE_CLASS, FUEL_TYPE, COLOR, SEATING, BODY_TYPE, TRANSMISSION],
    },
    SectionSpec {
        group: "⚙️ Engine Details",
        title: "⚙️ Engine Details",
        fields: &[
            ENGINE_NUMBER,
            CHASSIS_NUMBER,
            field("Cubic Capacity", &["/full_details/cubicCap"], Suffixed(" cc")),
            CYLINDERS,
        ],
    },
    SectionSpec {
        group: "📋 Insurance & Compliance",
        title: "📋 Insurance & Compliance",
        fields: &[
            INSURANCE_COMPANY,
            POLICY_NUMBER,
            INSURANCE_VALID,
            RC_STATUS,
            FITNESS_VALID,
            PUC_VALID,
        ],
    },
    SectionSpec {
        group: "💰 Finance Information",
        title: "💰 Finance Information",
        fields: &[
            HYPOTHECATION,
            FINANCIER,
            field("Commercial Vehicle", &["/isCommercial"], Truthy),
        ],
    },
];

/// Full table rendered as cards on the web page.
pub static CARD_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        group: "Basic Information",
        title: "Registration Details",
        fields: &[
            REGISTRATION_NUMBER,
            REGISTRATION_DATE,
            field("Registration Year", &["/regn_year"], Text),
            REGISTERED_AT,
            field("RTO Code", &["/RTO/rto_code"], Text),
            field("State", &["/states/state_name"], Text),
            OWNER_NAME,
            field("Owner Serial", &["/rc_owner_sr"], Text),
        ],
    },
    SectionSpec {
        group: "Vehicle Specifications",
        title: "Technical Details",
        fields: &[
            MAKE_MODEL,
            VARIANT,
            field("RC Model", &["/rc_model"], Text),
            VEHICLE_CLASS,
            field("Vehicle Category", &["/vehicleCategory"], Text),
            BODY_TYPE,
            COLOR,
            FUEL_TYPE,
            TRANSMISSION,
            field(
                "Transportation Category",
                &["/ds_details/0/variant/transportation_category"],
                Text,
            ),
        ],
    },
    SectionSpec {
        group: "Engine Details",
        title: "Engine Information",
        fields: &[
            ENGINE_NUMBER,
            CHASSIS_NUMBER,
            field(
                "Cubic Capacity",
                &["/cubicCap", "/full_details/cubicCap"],
                Suffixed(" cc"),
            ),
            CYLINDERS,
            field("Wheelbase", &["/full_details/wheelbase"], Suffixed(" mm")),
        ],
    },
    SectionSpec {
        group: "Weight Information",
        title: "Weight Details",
        fields: &[
            field("Unladen Weight", &["/unladenWt"], Suffixed(" kg")),
            field("Gross Weight", &["/full_details/grossWt"], Suffixed(" kg")),
            SEATING,
            field("Standing Capacity", &["/full_details/standCap"], Text),
            field("Sleeper Capacity", &["/full_details/sleeperCap"], Text),
        ],
    },
    SectionSpec {
        group: "Insurance & Compliance",
        title: "Insurance Details",
        fields: &[INSURANCE_COMPANY, POLICY_NUMBER, INSURANCE_VALID],
    },
    SectionSpec {
        group: "Insurance & Compliance",
        title: "Compliance Status",
        fields: &[
            RC_STATUS,
            field("RC Status As On", &["/rcStatusAsOn"], Date),
            field("PUC Number", &["/full_details/pucNo"], Text),
            PUC_VALID,
            FITNESS_VALID,
            field("Tax Valid Till", &["/taxUpTo"], Date),
        ],
    },
    SectionSpec {
        group: "Finance & NOC",
        title: "Financial Information",
        fields: &[
            HYPOTHECATION,
            FINANCIER,
            field("Blacklisted", &["/full_details/blacklisted"], TextOr("No")),
            field("RTO NOC Issued", &["/rtoNocIssued"], StringTrue),
            field("NOC Details", &["/full_details/nocDetails"], Text),
            field("Is Commercial", &["/isCommercial"], Truthy),
            field(
                "Commercial Franchise Region",
                &["/isCommercialFrachiseRegion"],
                Truthy,
            ),
        ],
    },
    SectionSpec {
        group: "Address Information",
        title: "Address Details",
        fields: &[
            field(
                "Present Address",
                &[
                    "/full_details/presentAddress",
                    "/full_details/presentAddressMasked",
                ],
                Text,
            ),
            field("Permanent Address", &["/presentAddressMasked"], Text),
            field("Pin Code", &["/full_details/pinCode"], Text),
            field("Mobile Number", &["/full_details/mobileNo"], Text),
        ],
    },
    SectionSpec {
        group: "Permit Information",
        title: "Permit Details",
        fields: &[
            field("Permit Number", &["/full_details/permitNo"], Text),
            field("Permit Type", &["/full_details/permitType"], Text),
            field("Permit Issue Date", &["/full_details/permitIssueDt"], Text),
            field("Valid From", &["/full_details/permitValidFrom"], Text),
            field("Valid Up To", &["/full_details/permitValidUpTo"], Text),
        ],
    },
    SectionSpec {
        group: "Additional Information",
        title: "Other Details",
        fields: &[
            field("Source", &["/full_details/source"], Text),
            field("NCRB Status", &["/full_details/ncrbStatus"], Text),
            field("Blacklist Status", &["/full_details/blacklistStatus"], Text),
            field("Manufacturing Date", &["/manufacturingMonthYr"], Text),
            field("Maker Name", &["/full_details/maker"], Text),
        ],
    },
];
